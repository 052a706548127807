//! Runtime values.
//!
//! [`Value`] is the only datum exchanged between evaluation steps. Procedures are
//! split into host-native [`Primitive`]s and user [`Closure`]s so that application
//! can match on the two cases directly. Closures hold their parameter list and
//! body as raw text together with a shared handle on the environment they were
//! created in.
//!
//! The helpers [`val`], [`sym`] and [`nil`] keep test tables and embedding code
//! short: `val([1, 2, 3])` is the list `(1 2 3)`, `sym("x")` is the symbol `x`.

use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::{Arity, Error};

/// Signature of a host-native procedure over its evaluated arguments.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, Error>;

/// Core value type.
#[derive(Clone)]
pub enum Value {
    /// Double-precision number; the only numeric type.
    Number(f64),
    /// Unevaluated atom text, as produced by `quote`.
    Symbol(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    Bool(bool),
    Nil,
    Procedure(Procedure),
    /// A global binding that stands for another global name (`=` for `equal?`).
    /// Variable lookup resolves these and never hands them out.
    Alias(String),
    /// Result of `define` and `set!`. Never equal to anything, itself included.
    Unspecified,
}

/// Something that can be applied to arguments.
#[derive(Clone)]
pub enum Procedure {
    Primitive(Rc<Primitive>),
    Closure(Rc<Closure>),
}

/// A procedure implemented in Rust.
pub struct Primitive {
    pub id: String,
    pub arity: Arity,
    pub func: BuiltinFn,
}

/// A procedure created by `lambda`.
pub struct Closure {
    /// Parameter list text including its brackets, e.g. `(x y)`.
    pub params: String,
    /// Body expression text; re-read on every call.
    pub body: String,
    /// Frames visible where the `lambda` was evaluated, shared rather than copied.
    pub env: Environment,
}

impl Value {
    /// Everything except `#f` and nil counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Value::Unspecified)
    }

    /// Short name of the value's kind, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Procedure(_) => "procedure",
            Value::Alias(_) => "alias",
            Value::Unspecified => "unspecified",
        }
    }

    pub fn primitive(id: &str, arity: Arity, func: BuiltinFn) -> Self {
        Value::Procedure(Procedure::Primitive(Rc::new(Primitive {
            id: id.to_owned(),
            arity,
            func,
        })))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(f64::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::List(arr.into_iter().map(Into::into).collect())
    }
}

/// Build a value from anything convertible.
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Build a symbol.
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// The empty list.
pub fn nil() -> Value {
    Value::List(vec![])
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Nil => write!(f, "nil"),
            Value::Procedure(Procedure::Primitive(p)) => write!(f, "#<builtin:{}>", p.id),
            Value::Procedure(Procedure::Closure(c)) => write!(f, "#<lambda {}>", c.params),
            Value::Alias(target) => write!(f, "#<alias:{target}>"),
            Value::Unspecified => write!(f, "#<unspecified>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::List(list) => f.debug_tuple("List").field(list).finish(),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Nil => write!(f, "Nil"),
            Value::Procedure(Procedure::Primitive(p)) => write!(f, "Primitive({})", p.id),
            Value::Procedure(Procedure::Closure(c)) => {
                write!(f, "Closure(params={}, body={})", c.params, c.body)
            }
            Value::Alias(target) => write!(f, "Alias({target})"),
            Value::Unspecified => write!(f, "Unspecified"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            // Primitives compare by name, closures by identity
            (
                Value::Procedure(Procedure::Primitive(a)),
                Value::Procedure(Procedure::Primitive(b)),
            ) => a.id == b.id,
            (Value::Procedure(Procedure::Closure(a)), Value::Procedure(Procedure::Closure(b))) => {
                Rc::ptr_eq(a, b)
            }
            (Value::Alias(a), Value::Alias(b)) => a == b,
            (Value::Unspecified, _) | (_, Value::Unspecified) => false,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_nil(_args: &[Value]) -> Result<Value, Error> {
        Ok(Value::Nil)
    }

    #[test]
    fn test_helper_functions() {
        let cases = vec![
            (val(42), Value::Number(42.0)),
            (val(-17), Value::Number(-17.0)),
            (val(2.5), Value::Number(2.5)),
            (val(255u8), Value::Number(255.0)),
            (val(true), Value::Bool(true)),
            (sym("equal?"), Value::Symbol("equal?".to_owned())),
            (nil(), Value::List(vec![])),
            (
                val([1, 2]),
                Value::List(vec![Value::Number(1.0), Value::Number(2.0)]),
            ),
            (
                val(vec![sym("+"), val(1)]),
                Value::List(vec![Value::Symbol("+".to_owned()), Value::Number(1.0)]),
            ),
        ];

        for (i, (actual, expected)) in cases.iter().enumerate() {
            assert_eq!(actual, expected, "helper case #{}", i + 1);
        }
    }

    #[test]
    fn test_display() {
        let closure = Value::Procedure(Procedure::Closure(Rc::new(Closure {
            params: "(x y)".to_owned(),
            body: "(+ x y)".to_owned(),
            env: Environment::new(),
        })));

        let cases = vec![
            (val(25), "25"),
            (val(0.5), "0.5"),
            (val(-3), "-3"),
            (val([1, 2, 3]), "(1 2 3)"),
            (val(vec![val([2, 3]), sym("a")]), "((2 3) a)"),
            (nil(), "()"),
            (Value::Nil, "nil"),
            (val(true), "#t"),
            (val(false), "#f"),
            (Value::primitive("+", Arity::Any, always_nil), "#<builtin:+>"),
            (closure, "#<lambda (x y)>"),
            (Value::Alias("equal?".to_owned()), "#<alias:equal?>"),
            (Value::Unspecified, "#<unspecified>"),
        ];

        for (value, expected) in cases {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(val(0).is_truthy());
        assert!(nil().is_truthy());
        assert!(sym("x").is_truthy());
    }

    #[test]
    fn test_procedure_equality() {
        let plus = Value::primitive("+", Arity::Any, always_nil);
        assert_eq!(plus, Value::primitive("+", Arity::Any, always_nil));
        assert_ne!(plus, Value::primitive("-", Arity::Any, always_nil));

        let closure = Rc::new(Closure {
            params: "(x)".to_owned(),
            body: "x".to_owned(),
            env: Environment::new(),
        });
        let a = Value::Procedure(Procedure::Closure(Rc::clone(&closure)));
        let b = Value::Procedure(Procedure::Closure(closure));
        let c = Value::Procedure(Procedure::Closure(Rc::new(Closure {
            params: "(x)".to_owned(),
            body: "x".to_owned(),
            env: Environment::new(),
        })));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unspecified_values() {
        let unspec = Value::Unspecified;
        assert_ne!(unspec, Value::Unspecified);
        assert_ne!(unspec, Value::Nil);
        assert!(Value::Unspecified.is_unspecified());
    }
}

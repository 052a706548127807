//! Built-in procedures, constants and aliases.
//!
//! Everything here ends up in the [`GlobalTable`] built by [`create_global_env`].
//! Primitives receive their arguments already evaluated and report bad input as
//! [`Error::TypeMismatch`]; argument counts are checked against each entry's
//! [`Arity`] before the function runs.
//!
//! ## Adding New Operations
//!
//! 1. Implement `fn(args: &[Value]) -> Result<Value, Error>`
//! 2. Add a [`BuiltinOp`] entry to `BUILTIN_OPS` with its identifier and arity
//! 3. Add test cases to the table below

use std::f64::consts::PI;

use crate::ast::{BuiltinFn, Value};
use crate::environment::GlobalTable;
use crate::{Arity, Error};

/// Definition of a built-in procedure.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinOp {
    pub id: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn type_error(op: &str, expected: &str, got: &Value) -> Error {
    Error::TypeMismatch(format!(
        "{op} expects {expected}, got {} {got}",
        got.type_name()
    ))
}

fn numbers(op: &str, args: &[Value]) -> Result<Vec<f64>, Error> {
    args.iter()
        .map(|arg| match arg {
            Value::Number(n) => Ok(*n),
            other => Err(type_error(op, "numbers", other)),
        })
        .collect()
}

fn number(op: &str, arg: &Value) -> Result<f64, Error> {
    match arg {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(op, "a number", other)),
    }
}

fn non_empty_list<'a>(op: &str, arg: &'a Value) -> Result<&'a [Value], Error> {
    match arg {
        Value::List(items) if !items.is_empty() => Ok(items),
        other => Err(type_error(op, "a non-empty list", other)),
    }
}

//
// Arithmetic
//

fn builtin_add(args: &[Value]) -> Result<Value, Error> {
    let sum = numbers("+", args)?.into_iter().fold(0.0, |acc, n| acc + n);
    Ok(Value::Number(sum))
}

fn builtin_mul(args: &[Value]) -> Result<Value, Error> {
    let product = numbers("*", args)?.into_iter().fold(1.0, |acc, n| acc * n);
    Ok(Value::Number(product))
}

fn builtin_sub(args: &[Value]) -> Result<Value, Error> {
    match numbers("-", args)?.as_slice() {
        [] => Err(Error::ArityMismatch {
            expected: Arity::AtLeast(1),
            got: 0,
        }),
        [only] => Ok(Value::Number(-only)),
        [first, rest @ ..] => {
            let total = rest.iter().fold(0.0, |acc, n| acc + n);
            Ok(Value::Number(first - total))
        }
    }
}

fn builtin_div(args: &[Value]) -> Result<Value, Error> {
    match numbers("/", args)?.as_slice() {
        [] => Err(Error::ArityMismatch {
            expected: Arity::AtLeast(1),
            got: 0,
        }),
        [only] => Ok(Value::Number(1.0 / only)),
        [first, rest @ ..] => {
            let divisor = rest.iter().fold(1.0, |acc, n| acc * n);
            Ok(Value::Number(first / divisor))
        }
    }
}

fn builtin_abs(args: &[Value]) -> Result<Value, Error> {
    match args {
        [n] => Ok(Value::Number(number("abs", n)?.abs())),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(1),
            got: args.len(),
        }),
    }
}

fn builtin_expt(args: &[Value]) -> Result<Value, Error> {
    match args {
        [base, exponent] => Ok(Value::Number(
            number("expt", base)?.powf(number("expt", exponent)?),
        )),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(2),
            got: args.len(),
        }),
    }
}

fn builtin_max(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("max", args)?;
    Ok(Value::Number(
        nums.into_iter().fold(f64::NEG_INFINITY, f64::max),
    ))
}

fn builtin_min(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("min", args)?;
    Ok(Value::Number(nums.into_iter().fold(f64::INFINITY, f64::min)))
}

// Comparisons chain over adjacent pairs: (< 1 2 3) holds when 1 < 2 and 2 < 3.
macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let nums = numbers($op_str, args)?;
            Ok(Value::Bool(nums.windows(2).all(|pair| pair[0] $op pair[1])))
        }
    };
}

numeric_comparison!(builtin_lt, <, "<");
numeric_comparison!(builtin_le, <=, "<=");
numeric_comparison!(builtin_gt, >, ">");
numeric_comparison!(builtin_ge, >=, ">=");

//
// Lists
//

fn builtin_car(args: &[Value]) -> Result<Value, Error> {
    match args {
        [list] => Ok(non_empty_list("car", list)?[0].clone()),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(1),
            got: args.len(),
        }),
    }
}

fn builtin_cdr(args: &[Value]) -> Result<Value, Error> {
    match args {
        [list] => Ok(Value::List(non_empty_list("cdr", list)?[1..].to_vec())),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(1),
            got: args.len(),
        }),
    }
}

fn builtin_cons(args: &[Value]) -> Result<Value, Error> {
    match args {
        [head, Value::List(tail)] => {
            let mut list = Vec::with_capacity(tail.len() + 1);
            list.push(head.clone());
            list.extend_from_slice(tail);
            Ok(Value::List(list))
        }
        [head, Value::Nil] => Ok(Value::List(vec![head.clone()])),
        [_, other] => Err(type_error("cons", "a list as second argument", other)),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(2),
            got: args.len(),
        }),
    }
}

fn builtin_list(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::List(args.to_vec()))
}

fn builtin_null(args: &[Value]) -> Result<Value, Error> {
    match args {
        [value] => Ok(Value::Bool(match value {
            Value::Nil => true,
            Value::List(items) => items.is_empty(),
            _ => false,
        })),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(1),
            got: args.len(),
        }),
    }
}

//
// Equality and logic
//

fn builtin_equal(args: &[Value]) -> Result<Value, Error> {
    match args {
        [a, b] => Ok(Value::Bool(a == b)),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(2),
            got: args.len(),
        }),
    }
}

fn builtin_not(args: &[Value]) -> Result<Value, Error> {
    match args {
        [value] => Ok(Value::Bool(!value.is_truthy())),
        _ => Err(Error::ArityMismatch {
            expected: Arity::Exact(1),
            got: args.len(),
        }),
    }
}

/// Registry of all primitive procedures.
static BUILTIN_OPS: &[BuiltinOp] = &[
    // Arithmetic
    BuiltinOp { id: "+", arity: Arity::Any, func: builtin_add },
    BuiltinOp { id: "-", arity: Arity::AtLeast(1), func: builtin_sub },
    BuiltinOp { id: "*", arity: Arity::Any, func: builtin_mul },
    BuiltinOp { id: "/", arity: Arity::AtLeast(1), func: builtin_div },
    BuiltinOp { id: "abs", arity: Arity::Exact(1), func: builtin_abs },
    BuiltinOp { id: "expt", arity: Arity::Exact(2), func: builtin_expt },
    BuiltinOp { id: "max", arity: Arity::AtLeast(1), func: builtin_max },
    BuiltinOp { id: "min", arity: Arity::AtLeast(1), func: builtin_min },
    // Comparison
    BuiltinOp { id: "<", arity: Arity::AtLeast(2), func: builtin_lt },
    BuiltinOp { id: "<=", arity: Arity::AtLeast(2), func: builtin_le },
    BuiltinOp { id: ">", arity: Arity::AtLeast(2), func: builtin_gt },
    BuiltinOp { id: ">=", arity: Arity::AtLeast(2), func: builtin_ge },
    // Lists
    BuiltinOp { id: "car", arity: Arity::Exact(1), func: builtin_car },
    BuiltinOp { id: "cdr", arity: Arity::Exact(1), func: builtin_cdr },
    BuiltinOp { id: "cons", arity: Arity::Exact(2), func: builtin_cons },
    BuiltinOp { id: "list", arity: Arity::Any, func: builtin_list },
    BuiltinOp { id: "null?", arity: Arity::Exact(1), func: builtin_null },
    // Equality and logic
    BuiltinOp { id: "equal?", arity: Arity::Exact(2), func: builtin_equal },
    BuiltinOp { id: "not", arity: Arity::Exact(1), func: builtin_not },
];

/// Names bound to plain values at startup.
fn constants() -> [(&'static str, Value); 4] {
    [
        ("pi", Value::Number(PI)),
        ("#t", Value::Bool(true)),
        ("#f", Value::Bool(false)),
        ("nil", Value::Nil),
    ]
}

/// `(alias, target)` pairs installed at startup.
const ALIASES: &[(&str, &str)] = &[("=", "equal?")];

/// All primitive procedures.
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}

/// Create the global table with every primitive, constant and alias bound.
pub fn create_global_env() -> GlobalTable {
    let mut env = GlobalTable::new();

    for op in get_builtin_ops() {
        env.install(op.id, Value::primitive(op.id, op.arity, op.func));
    }
    for (name, value) in constants() {
        env.install(name, value);
    }
    for (alias, target) in ALIASES {
        env.install(alias, Value::Alias((*target).to_owned()));
    }

    env
}

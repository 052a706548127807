//! Variable bindings: local frame chains and the global table.
//!
//! An [`Environment`] is a chain of local frames and never includes the globals;
//! every lookup that runs off the end of the chain falls through to the
//! [`GlobalTable`], which the evaluator passes around explicitly. An empty
//! environment therefore means "globals only".
//!
//! Frames own their binding tables through `Rc<RefCell<..>>`. Copying a chain
//! copies only the links: the copied frames still point at the same tables, so an
//! assignment made through any copy is seen by all of them. This is what lets a
//! call splice a closure's captured chain behind its own frames without either
//! chain being modified.

use std::cell::RefCell;
use std::collections::HashMap;
use std::iter;
use std::rc::Rc;

use crate::ast::{BuiltinFn, Value};
use crate::{Arity, Error};

type Bindings = Rc<RefCell<HashMap<String, Value>>>;

struct Frame {
    bindings: Bindings,
    outer: Option<Rc<Frame>>,
}

/// A chain of local scope frames.
#[derive(Clone, Default)]
pub struct Environment {
    head: Option<Rc<Frame>>,
}

/// The frame that owns a binding, as found by [`Environment::frame_of`].
#[derive(Clone)]
pub enum Owner {
    Local(Bindings),
    Global,
}

impl Environment {
    /// An empty chain: lookups consult only the global table.
    pub fn new() -> Self {
        Environment { head: None }
    }

    /// A new frame holding `bindings`, chained in front of this one.
    pub fn extend<I>(&self, bindings: I) -> Environment
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Environment {
            head: Some(Rc::new(Frame {
                bindings: Rc::new(RefCell::new(bindings.into_iter().collect())),
                outer: self.head.clone(),
            })),
        }
    }

    /// A copy of this chain with `tail` attached after its last frame.
    ///
    /// The frames of `self` are re-linked, not mutated, and their binding tables
    /// are shared with the originals. `tail` is attached as is.
    pub fn splice(&self, tail: &Environment) -> Environment {
        let tables: Vec<Bindings> = self
            .frames()
            .map(|frame| Rc::clone(&frame.bindings))
            .collect();

        let mut head = tail.head.clone();
        for bindings in tables.into_iter().rev() {
            head = Some(Rc::new(Frame {
                bindings,
                outer: head,
            }));
        }
        Environment { head }
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        iter::successors(self.head.as_deref(), |frame| frame.outer.as_deref())
    }

    /// Number of frames in the chain.
    pub fn depth(&self) -> usize {
        self.frames().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn lookup(&self, name: &str, globals: &GlobalTable) -> Option<Value> {
        self.frames()
            .find_map(|frame| frame.bindings.borrow().get(name).cloned())
            .or_else(|| globals.get(name).cloned())
    }

    /// Value bound to `name`, searching this chain first and then the globals.
    ///
    /// Aliases are followed through the global table until a real value turns up.
    /// A dangling or cyclic alias fails like an unbound name.
    pub fn read(&self, name: &str, globals: &GlobalTable) -> Result<Value, Error> {
        let mut value = self
            .lookup(name, globals)
            .ok_or_else(|| Error::UnboundVariable(name.to_owned()))?;

        let mut seen = vec![name.to_owned()];
        while let Value::Alias(target) = value {
            if seen.contains(&target) {
                return Err(Error::UnboundVariable(name.to_owned()));
            }
            value = globals
                .get(&target)
                .cloned()
                .ok_or_else(|| Error::UnboundVariable(target.clone()))?;
            seen.push(target);
        }

        Ok(value)
    }

    /// The frame that holds `name`, in the same search order as [`read`](Self::read).
    pub fn frame_of(&self, name: &str, globals: &GlobalTable) -> Option<Owner> {
        self.frames()
            .find(|frame| frame.bindings.borrow().contains_key(name))
            .map(|frame| Owner::Local(Rc::clone(&frame.bindings)))
            .or_else(|| globals.contains(name).then_some(Owner::Global))
    }
}

impl Owner {
    /// Overwrite `name` in this frame.
    pub fn assign(&self, name: &str, value: Value, globals: &mut GlobalTable) -> Result<(), Error> {
        match self {
            Owner::Local(bindings) => {
                bindings.borrow_mut().insert(name.to_owned(), value);
                Ok(())
            }
            Owner::Global => globals.set(name, value),
        }
    }
}

/// The root scope: primitives, constants and everything `define` creates.
#[derive(Clone, Default)]
pub struct GlobalTable {
    bindings: HashMap<String, Value>,
}

impl GlobalTable {
    /// An empty table with no primitives; see [`crate::create_global_env`].
    pub fn new() -> Self {
        GlobalTable {
            bindings: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bind a new name. Names are never rebound.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if self.contains(name) {
            return Err(Error::Redefinition(name.to_owned()));
        }
        self.bindings.insert(name.to_owned(), value);
        Ok(())
    }

    /// Startup-time insertion that skips the redefinition check.
    pub(crate) fn install(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_owned(), value);
    }

    /// Overwrite an existing binding.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), Error> {
        match self.bindings.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::UnboundVariable(name.to_owned())),
        }
    }

    /// Make `alias` stand for the global `target`.
    pub fn define_alias(&mut self, alias: &str, target: &str) -> Result<(), Error> {
        self.define(alias, Value::Alias(target.to_owned()))
    }

    /// Register a host function so that evaluated expressions can call it by `name`.
    ///
    /// # Example
    /// ```
    /// use minilisp::{Arity, Error, Value, create_global_env, eval};
    ///
    /// fn twice(args: &[Value]) -> Result<Value, Error> {
    ///     match args {
    ///         [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
    ///         _ => Err(Error::TypeMismatch("twice expects a number".into())),
    ///     }
    /// }
    ///
    /// let mut globals = create_global_env();
    /// globals.register_builtin_function("twice", Arity::Exact(1), twice).unwrap();
    /// assert_eq!(eval("(twice 21)", &mut globals).unwrap(), Value::Number(42.0));
    /// ```
    pub fn register_builtin_function(
        &mut self,
        name: &str,
        arity: Arity,
        func: BuiltinFn,
    ) -> Result<(), Error> {
        self.define(name, Value::primitive(name, arity, func))
    }

    /// All bindings as `(name, value)` pairs sorted by name.
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut result: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

//! minilisp - a minimal S-expression evaluator
//!
//! This crate evaluates a small Scheme/Lisp dialect straight from text. There is no
//! separate tokenizing pass: the reader splits a form into its sibling
//! sub-expressions on demand, and closure bodies are kept as raw text and re-read
//! every time they are applied.
//!
//! ```scheme
//! (define square (lambda (x) (* x x)))
//! (square 5)                 ; 25
//! (if (> 3 2) 1 0)           ; 1
//! (car (quote (1 2 3)))      ; 1
//! ((lambda (x y) (+ x y)) 3 4)
//! ```
//!
//! ## Scoping
//!
//! - `define` always binds in the [`environment::GlobalTable`] and refuses to
//!   rebind an existing name.
//! - `set!` overwrites the nearest existing binding, local or global.
//! - A closure body sees its parameters first, then the call-time frames, then the
//!   frames captured where the `lambda` was evaluated, then the globals. Captured
//!   frames are shared, so `set!` through one closure is visible to every other
//!   closure holding the same frame.
//!
//! ## Modules
//!
//! - `number`: numeric literal parser
//! - `reader`: sibling splitting and bracket matching over raw text
//! - `ast`: the runtime [`ast::Value`] type
//! - `environment`: local frame chains and the global table
//! - `builtinops`: primitive procedures and constants
//! - `evaluator`: special-form dispatch and procedure application

use std::fmt;

/// Default limit on nested evaluation steps for a single input line.
///
/// A non-tail user call costs about three levels (body, branch, argument), so
/// this allows roughly a hundred nested calls while staying well inside a 2 MB
/// thread stack.
pub const MAX_EVAL_DEPTH: usize = 320;

/// Runtime knobs for the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum nesting of `evaluate` calls before failing with
    /// [`Error::DepthExceeded`].
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: MAX_EVAL_DEPTH,
        }
    }
}

/// Expected number of arguments for a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Any,
}

impl Arity {
    pub fn validate(self, got: usize) -> Result<(), Error> {
        let ok = match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::ArityMismatch {
                expected: self,
                got,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// Everything that can abort evaluation of one input line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A special form received the wrong shape of sub-expressions.
    #[error("malformed {form}: {detail}")]
    MalformedForm { form: &'static str, detail: String },

    #[error("unbound variable: {0}")]
    UnboundVariable(String),

    /// `define` targeted a name the global table already holds.
    #[error("cannot redefine {0}")]
    Redefinition(String),

    #[error("invalid number of arguments: expected {expected}, got {got}")]
    ArityMismatch { expected: Arity, got: usize },

    /// The reader could not extract a well-formed sibling.
    #[error("invalid sub-expression: {0}")]
    InvalidSubform(String),

    #[error("input invalid for all interpreters: {0}")]
    NoInterpretationMatched(String),

    /// A primitive got an argument of the wrong kind, or a non-procedure was applied.
    #[error("type error: {0}")]
    TypeMismatch(String),

    #[error("evaluation depth limit exceeded (max: {0})")]
    DepthExceeded(usize),
}

impl Error {
    pub(crate) fn malformed(form: &'static str, detail: impl Into<String>) -> Self {
        Error::MalformedForm {
            form,
            detail: detail.into(),
        }
    }

    /// Build a `MalformedForm` for a wrong sibling count.
    pub(crate) fn sibling_count(form: &'static str, expected: usize, got: usize) -> Self {
        Error::malformed(
            form,
            format!("expected {expected} sub-expressions, got {got}"),
        )
    }

    /// Whether this is one of the language-level ("syntax") failures, as opposed to
    /// a host failure such as a primitive type error.
    pub fn is_syntax_error(&self) -> bool {
        !matches!(self, Error::TypeMismatch(_) | Error::DepthExceeded(_))
    }
}

pub mod ast;
pub mod builtinops;
pub mod environment;
pub mod evaluator;
pub mod number;
pub mod reader;

pub use ast::{Closure, Primitive, Procedure, Value};
pub use builtinops::create_global_env;
pub use environment::{Environment, GlobalTable};
pub use evaluator::{eval, eval_with_config};

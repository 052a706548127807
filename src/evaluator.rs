//! Special-form dispatch and procedure application over raw text.
//!
//! [`eval`] takes one line of input. A bracketed form is split into siblings and
//! dispatched on its head: `define`, `if`, `quote`, `lambda` and `set!` are
//! recognized first, anything else is a procedure application. A bare atom is a
//! variable reference or, failing that, a numeral.
//!
//! Closure bodies are stored as text and split again on every call, so no parse
//! state is shared between calls.

use log::{debug, trace};

use crate::ast::{Closure, Procedure, Value};
use crate::environment::{Environment, GlobalTable};
use crate::number::{looks_numeric, parse_number_exact};
use crate::reader::{OPEN, datum, is_atom, split_form};
use crate::{Arity, Error, EvalConfig};
use std::rc::Rc;

/// Evaluate one expression against `globals` (public API).
pub fn eval(input: &str, globals: &mut GlobalTable) -> Result<Value, Error> {
    eval_with_config(input, globals, &EvalConfig::default())
}

/// Evaluate one expression with explicit limits.
pub fn eval_with_config(
    input: &str,
    globals: &mut GlobalTable,
    config: &EvalConfig,
) -> Result<Value, Error> {
    let mut evaluator = Evaluator {
        globals,
        max_depth: config.max_depth,
    };
    evaluator.evaluate(input.trim(), &Environment::new(), 0)
}

struct Evaluator<'g> {
    globals: &'g mut GlobalTable,
    max_depth: usize,
}

impl Evaluator<'_> {
    /// Evaluate `text` with depth tracking to prevent stack overflow.
    fn evaluate(&mut self, text: &str, env: &Environment, depth: usize) -> Result<Value, Error> {
        if depth >= self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth));
        }
        let text = text.trim();
        trace!("evaluate[{depth}]: {text}");

        if text.starts_with(OPEN) {
            self.evaluate_form(text, env, depth)
        } else {
            self.evaluate_atom(text, env)
        }
    }

    /// Variable lookup first, then numeral.
    fn evaluate_atom(&self, text: &str, env: &Environment) -> Result<Value, Error> {
        if text.is_empty() {
            return Err(Error::NoInterpretationMatched(String::new()));
        }
        if !is_atom(text) {
            return Err(Error::InvalidSubform(format!(
                "not a single expression: '{text}'"
            )));
        }

        match env.read(text, self.globals) {
            Ok(value) => return Ok(value),
            Err(Error::UnboundVariable(name)) if name == text => {}
            Err(err) => return Err(err),
        }

        if let Some(n) = parse_number_exact(text) {
            return Ok(Value::Number(n));
        }

        if looks_numeric(text) {
            Err(Error::NoInterpretationMatched(text.to_owned()))
        } else {
            Err(Error::UnboundVariable(text.to_owned()))
        }
    }

    fn evaluate_form(&mut self, text: &str, env: &Environment, depth: usize) -> Result<Value, Error> {
        let siblings = split_form(text)?;
        let Some((head, args)) = siblings.split_first() else {
            return Err(Error::NoInterpretationMatched(text.to_owned()));
        };

        // Keywords are checked before any lookup, so a variable named `if`
        // never shadows the form.
        match *head {
            "define" => self.eval_define(args, env, depth),
            "if" => self.eval_if(args, env, depth),
            "quote" => eval_quote(args),
            "lambda" => eval_lambda(args, env),
            "set!" => self.eval_set(args, env, depth),
            _ => self.eval_application(head, args, env, depth),
        }
    }

    /// `(define name expr)`: always binds in the global table.
    fn eval_define(&mut self, args: &[&str], env: &Environment, depth: usize) -> Result<Value, Error> {
        let [name, value_expr] = args else {
            return Err(Error::sibling_count("define", 2, args.len()));
        };
        let name = binding_name("define", name)?;
        if self.globals.contains(name) {
            return Err(Error::Redefinition(name.to_owned()));
        }

        let value = bound_value("define", self.evaluate(value_expr, env, depth + 1)?)?;
        debug!("define {name} = {value}");
        self.globals.define(name, value)?;
        Ok(Value::Unspecified)
    }

    /// `(if test conseq alt)`: only the chosen branch is evaluated.
    fn eval_if(&mut self, args: &[&str], env: &Environment, depth: usize) -> Result<Value, Error> {
        let [test, conseq, alt] = args else {
            return Err(Error::sibling_count("if", 3, args.len()));
        };

        let branch = if self.evaluate(test, env, depth + 1)?.is_truthy() {
            conseq
        } else {
            alt
        };
        self.evaluate(branch, env, depth + 1)
    }

    /// `(set! name expr)`: overwrites the nearest existing binding.
    fn eval_set(&mut self, args: &[&str], env: &Environment, depth: usize) -> Result<Value, Error> {
        let [name, value_expr] = args else {
            return Err(Error::sibling_count("set!", 2, args.len()));
        };
        let name = binding_name("set!", name)?;
        let owner = env
            .frame_of(name, self.globals)
            .ok_or_else(|| Error::UnboundVariable(name.to_owned()))?;

        let value = bound_value("set!", self.evaluate(value_expr, env, depth + 1)?)?;
        debug!("set! {name} = {value}");
        owner.assign(name, value, self.globals)?;
        Ok(Value::Unspecified)
    }

    fn eval_application(
        &mut self,
        head: &str,
        args: &[&str],
        env: &Environment,
        depth: usize,
    ) -> Result<Value, Error> {
        let procedure = match self.evaluate(head, env, depth + 1)? {
            Value::Procedure(procedure) => procedure,
            other => {
                return Err(Error::TypeMismatch(format!(
                    "cannot apply {} {other}",
                    other.type_name()
                )));
            }
        };

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg, env, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;

        self.apply(&procedure, &values, env, depth)
    }

    /// Apply a procedure to already-evaluated arguments.
    ///
    /// A closure body sees its parameters, then `call_env`, then the frames the
    /// closure captured, then the globals.
    fn apply(
        &mut self,
        procedure: &Procedure,
        args: &[Value],
        call_env: &Environment,
        depth: usize,
    ) -> Result<Value, Error> {
        match procedure {
            Procedure::Primitive(primitive) => {
                primitive.arity.validate(args.len())?;
                (primitive.func)(args)
            }
            Procedure::Closure(closure) => {
                let params = parameter_names(&closure.params)?;
                Arity::Exact(params.len()).validate(args.len())?;
                debug!(
                    "apply #<lambda {}> to {} argument(s): {}",
                    closure.params,
                    args.len(),
                    closure.body
                );

                let scope = call_env.splice(&closure.env);
                let frame = if params.is_empty() {
                    scope
                } else {
                    scope.extend(
                        params
                            .into_iter()
                            .map(str::to_owned)
                            .zip(args.iter().cloned()),
                    )
                };
                self.evaluate(&closure.body, &frame, depth + 1)
            }
        }
    }
}

/// `(quote expr)`: the sibling as data, nothing evaluated.
fn eval_quote(args: &[&str]) -> Result<Value, Error> {
    let [expr] = args else {
        return Err(Error::sibling_count("quote", 1, args.len()));
    };
    datum(expr)
}

/// `(lambda (params...) body)`: captures `env` by sharing its frames.
fn eval_lambda(args: &[&str], env: &Environment) -> Result<Value, Error> {
    let [params, body] = args else {
        return Err(Error::sibling_count("lambda", 2, args.len()));
    };
    parameter_names(params)?;
    debug!("lambda {params} over {} frame(s)", env.depth());

    Ok(Value::Procedure(Procedure::Closure(Rc::new(Closure {
        params: (*params).to_owned(),
        body: (*body).to_owned(),
        env: env.clone(),
    }))))
}

/// Split and check a bracketed parameter list.
fn parameter_names(text: &str) -> Result<Vec<&str>, Error> {
    if !text.starts_with(OPEN) {
        return Err(Error::malformed(
            "lambda",
            format!("parameter list must be bracketed, got '{text}'"),
        ));
    }

    let names = split_form(text)?;
    for (i, name) in names.iter().enumerate() {
        binding_name("lambda", name)?;
        if names[..i].contains(name) {
            return Err(Error::malformed(
                "lambda",
                format!("duplicate parameter '{name}'"),
            ));
        }
    }
    Ok(names)
}

/// Reject results of `define`/`set!` as values to bind.
fn bound_value(form: &'static str, value: Value) -> Result<Value, Error> {
    if value.is_unspecified() {
        Err(Error::malformed(form, "value expression produced no value"))
    } else {
        Ok(value)
    }
}

/// A name that can be bound: an atom that is not a numeral.
fn binding_name<'a>(form: &'static str, text: &'a str) -> Result<&'a str, Error> {
    if is_atom(text) && parse_number_exact(text).is_none() {
        Ok(text)
    } else {
        Err(Error::malformed(
            form,
            format!("expected a name, got '{text}'"),
        ))
    }
}

//! Expression evaluation using CEL
//!
//! Every templated field of an event is a CEL (Common Expression Language)
//! expression evaluated against the runtime event body. This module wraps the
//! CEL engine behind a narrow interface so the rest of the crate only deals in
//! compiled expressions and string results.
//!
//! # Implementation Model
//!
//! - [`Environment`] is built once per run. It owns the root CEL context with
//!   the string extension functions registered.
//! - [`Environment::activate`] binds an [`EvaluationContext`] as the `body`
//!   variable in a child scope, producing an [`Activation`].
//! - [`Environment::compile`] parses an expression and checks that it only
//!   references `body` and functions the environment provides.
//! - [`Activation::eval_string`] is what templates go through: sentinel
//!   templates (`""` and `''`) short-circuit to an empty string, anything else
//!   must compile, run, and yield a string.
//!
//! Failures are reported as [`EvalError`] values carrying the offending
//! expression text. Nothing is silently stringified.

mod environment;
mod eval_error;
mod evaluation_context;
mod strings;

pub use environment::{Activation, BODY_VARIABLE, CompiledExpression, Environment, is_empty_sentinel};
pub use eval_error::EvalError;
pub use evaluation_context::EvaluationContext;

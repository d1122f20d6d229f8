#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for sts-emitter
//!
//! This library consolidates all functionality for the sts-emitter tool, which
//! binds CEL templates against a JSON event body to build a StackState event,
//! then posts it (and optionally a presence metric) to an agent receiver.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`expr`]: CEL expression environment and evaluation
//! - [`binding`]: Template binding and metric derivation
//! - [`payload`]: Wire payloads for the receiver
//! - [`submit`]: HTTP submission to the receiver

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod binding;
#[cfg(not(any(debug_assertions, test)))]
mod binding;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod expr;
#[cfg(not(any(debug_assertions, test)))]
mod expr;

#[cfg(any(debug_assertions, test))]
pub mod payload;
#[cfg(not(any(debug_assertions, test)))]
mod payload;

#[cfg(any(debug_assertions, test))]
pub mod submit;
#[cfg(not(any(debug_assertions, test)))]
mod submit;

pub use crate::commands::{Config, EmitOutcome, Host, MetricDisposition, emit, run};
pub use crate::expr::EvaluationContext;

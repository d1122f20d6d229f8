//! Command-line interface and orchestration for sts-emitter
//!
//! This module implements the CLI commands and wires the expression, binding,
//! payload, and submission layers into a single run.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **emit**: Load the configuration, parse the event body, bind every
//!   template, and post the event followed by the optional presence metric
//! - **validate**: Load the configuration and compile every template without
//!   sending anything
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap, sets up logging,
//! and routes to the appropriate command handler. Configuration is layered:
//! built-in defaults, then an optional TOML file, then environment variables and
//! flags (see [`ConfigArgs`]).
//!
//! An emit is a single transaction. All templates are evaluated before the first
//! request, the event must be accepted for the run to succeed, and a metric that
//! fails to send is logged and reported without failing the run.

mod common;
mod config;
mod emit;
mod host;
mod init;
mod run;
mod validate;

pub use common::{ConfigArgs, LogLevel};
pub use config::{Config, DEFAULT_CONFIG_TOML};
pub use emit::{EmitArgs, EmitOutcome, MetricDisposition, emit, process_emit};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};

//! Command dispatch logic for sts-emitter

use super::common::{LogLevel, init_logging};
use super::{EmitArgs, InitArgs, ValidateArgs, init_config, process_emit, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "sts-emitter", author, version, long_about = None)]
#[command(about = "Send a templated event, and optionally a presence metric, to a StackState receiver")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    /// Diagnostic output level
    #[arg(long, value_enum, default_value = "info", global = true, value_name = "LEVEL")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: EmitterSubcommand,
}

#[derive(Subcommand, Debug)]
enum EmitterSubcommand {
    /// Evaluate the templates against the event body and send the results
    Emit(Box<EmitArgs>),
    /// Check that the configuration loads and every template compiles
    Validate(Box<ValidateArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.log_level);

    match &cli.command {
        EmitterSubcommand::Emit(emit_args) => process_emit(host, emit_args).await,
        EmitterSubcommand::Validate(validate_args) => validate_config(host, validate_args),
        EmitterSubcommand::Init(init_args) => init_config(host, init_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_is_global() {
        let cli = Cli::try_parse_from(["sts-emitter", "validate", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_emit_flags() {
        let cli = Cli::try_parse_from([
            "sts-emitter",
            "emit",
            "--api-url",
            "http://localhost",
            "--type",
            "'Deploy'",
            "--tags",
            "'a','b'",
            "--body",
            "{}",
        ])
        .unwrap();

        let EmitterSubcommand::Emit(args) = cli.command else {
            panic!("expected the emit subcommand");
        };
        assert_eq!(args.config.api_url.as_deref(), Some("http://localhost"));
        assert_eq!(args.config.event_type.as_deref(), Some("'Deploy'"));
        assert_eq!(args.config.tags, Some(vec!["'a'".to_string(), "'b'".to_string()]));
        assert_eq!(args.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_init_path() {
        let cli = Cli::try_parse_from(["sts-emitter", "init", "out.toml"]).unwrap();
        let EmitterSubcommand::Init(args) = cli.command else {
            panic!("expected the init subcommand");
        };
        assert_eq!(args.output.as_deref().map(camino::Utf8Path::as_str), Some("out.toml"));
    }
}

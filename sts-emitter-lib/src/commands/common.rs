//! Arguments and setup shared between commands.

use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use core::time::Duration;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Where configuration comes from
///
/// Each flag can also be supplied through the environment variable named in
/// its help. Values given here override the configuration file, which in turn
/// overrides the built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', value_name = "PATH", env = "STS_EMITTER_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Base URL of the StackState receiver
    #[arg(long, value_name = "URL", env = "API_URL")]
    pub api_url: Option<String>,

    /// Receiver API key
    #[arg(long, value_name = "KEY", env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// CEL expression naming the presence metric to send with the event
    #[arg(long, value_name = "EXPR", env = "METRIC_NAME")]
    pub metric_name: Option<String>,

    /// Accept any TLS certificate presented by the receiver
    #[arg(long, env = "API_TLS_SKIP_VERIFY")]
    pub tls_skip_verify: bool,

    /// Per-request timeout, e.g. `30s`
    #[arg(long, value_name = "DURATION", env = "API_TIMEOUT", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// CEL expression for the reporting host name
    #[arg(long, value_name = "EXPR", env = "EVT_ORIGIN_HOST", help_heading = "Event Templates")]
    pub origin_host: Option<String>,

    /// Name of the originating system, copied verbatim
    #[arg(long, value_name = "TEXT", env = "EVT_SOURCE", help_heading = "Event Templates")]
    pub source: Option<String>,

    /// CEL expression for the event category
    #[arg(long, value_name = "EXPR", env = "EVT_CATEGORY", help_heading = "Event Templates")]
    pub category: Option<String>,

    /// CEL expression for the event type
    #[arg(long = "type", value_name = "EXPR", env = "EVT_TYPE", help_heading = "Event Templates")]
    pub event_type: Option<String>,

    /// CEL expression for the event title
    #[arg(long, value_name = "EXPR", env = "EVT_TITLE", help_heading = "Event Templates")]
    pub title: Option<String>,

    /// CEL expression for the event text
    #[arg(long, value_name = "EXPR", env = "EVT_TEXT", help_heading = "Event Templates")]
    pub text: Option<String>,

    /// CEL expression for the topology element identifier
    #[arg(long, value_name = "EXPR", env = "EVT_IDENTIFIER", help_heading = "Event Templates")]
    pub identifier: Option<String>,

    /// CEL expression for the source link title
    #[arg(long, value_name = "EXPR", env = "EVT_LINK_TITLE", help_heading = "Event Templates")]
    pub link_title: Option<String>,

    /// CEL expression for the source link URL
    #[arg(long, value_name = "EXPR", env = "EVT_LINK_URL", help_heading = "Event Templates")]
    pub link_url: Option<String>,

    /// CEL expressions for the event tags, comma-separated
    #[arg(long = "tags", value_name = "EXPR", env = "EVT_TAGS", value_delimiter = ',', help_heading = "Event Templates")]
    pub tags: Option<Vec<String>>,
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

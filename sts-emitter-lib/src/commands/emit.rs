use super::Host;
use super::common::ConfigArgs;
use super::config::Config;
use crate::Result;
use crate::binding::{bind_event, bind_metric_name, derive_metric};
use crate::expr::{Environment, EvaluationContext};
use crate::payload::EventPayload;
use crate::submit::Client;
use chrono::{DateTime, Utc};
use clap::Parser;
use core::fmt;
use ohno::IntoAppError;
use std::io::Write;

const LOG_TARGET: &str = "      emit";

#[derive(Parser, Debug, Clone, Default)]
pub struct EmitArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// JSON object exposed to expressions as `body`
    #[arg(long, value_name = "JSON", env = "BODY")]
    pub body: Option<String>,
}

/// What happened to the presence metric during an emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricDisposition {
    /// No metric name was configured, or it evaluated to an empty string
    NotRequested,

    /// The event carries no element identifier to attach the metric to
    Skipped,

    /// The metric was accepted by the receiver
    Sent,

    /// The metric was rejected or could not be delivered
    Failed(String),
}

impl fmt::Display for MetricDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequested => write!(f, "not requested"),
            Self::Skipped => write!(f, "skipped"),
            Self::Sent => write!(f, "sent"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Result of a successful emit
#[derive(Debug, Clone)]
pub struct EmitOutcome {
    /// The event payload that was accepted by the receiver
    pub event: EventPayload,

    /// What happened to the presence metric
    pub metric: MetricDisposition,
}

/// Bind the configured templates against `context` and post the results
///
/// Every template, including the metric name, is evaluated before anything is
/// sent. The event must be accepted for the emit to succeed; a metric failure
/// is logged and reported in the outcome instead.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, a template fails to
/// evaluate, or the event is not accepted
pub async fn emit(config: &Config, context: &EvaluationContext, now: DateTime<Utc>) -> Result<EmitOutcome> {
    let client = Client::new(&config.api_url, config.api_key.as_str(), config.transport_options())?;

    let (event, metric_name) = {
        let environment = Environment::new();
        let activation = environment.activate(context);

        let event = bind_event(&activation, &config.event, now)?;
        let metric_name = bind_metric_name(&activation, &config.metric_name)?;
        (event, metric_name)
    };

    client
        .send_event(&event)
        .await
        .into_app_err_with(|| format!("sending event to {}", client.base_url()))?;

    let metric = if metric_name.is_empty() {
        MetricDisposition::NotRequested
    } else {
        match derive_metric(&metric_name, &event) {
            None => MetricDisposition::Skipped,
            Some(series) => match client.send_metric(&series).await {
                Ok(()) => MetricDisposition::Sent,
                Err(e) => {
                    log::error!(target: LOG_TARGET, "Metric '{metric_name}' was not delivered: {e}");
                    MetricDisposition::Failed(e.to_string())
                }
            },
        }
    };

    Ok(EmitOutcome { event, metric })
}

pub async fn process_emit<H: Host>(host: &mut H, args: &EmitArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let context = EvaluationContext::parse(args.body.as_deref())?;

    let outcome = emit(&config, &context, Utc::now()).await?;

    let title = outcome.event.event().map_or("", |e| e.title.as_str());
    let _ = writeln!(host.output(), "Event '{title}' sent, metric {}", outcome.metric);
    Ok(())
}

use super::common::ConfigArgs;
use crate::Result;
use crate::binding::TemplateSet;
use crate::submit::TransportOptions;
use camino::Utf8Path;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the StackState receiver
    #[serde(default)]
    pub api_url: String,

    /// Receiver API key
    #[serde(default)]
    pub api_key: String,

    /// CEL expression naming the presence metric; empty means no metric is sent
    #[serde(default)]
    pub metric_name: String,

    /// Accept any TLS certificate presented by the receiver
    #[serde(default)]
    pub tls_skip_verify: bool,

    /// Per-request timeout; requests are unbounded when unset
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Templates for each event field
    #[serde(default)]
    pub event: TemplateSet,
}

impl Config {
    /// Resolve the configuration from defaults, an optional file, and command-line/environment values
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the result fails validation
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply(args);
        config.validate()?;

        Ok(config)
    }

    /// Read a configuration file without validating it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading sts-emitter configuration file '{path}'"))?;
        toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{path}'"))
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Overlay values given on the command line or through the environment
    pub fn apply(&mut self, args: &ConfigArgs) {
        let overrides = [
            (&args.api_url, &mut self.api_url),
            (&args.api_key, &mut self.api_key),
            (&args.metric_name, &mut self.metric_name),
            (&args.origin_host, &mut self.event.origin_host),
            (&args.source, &mut self.event.source),
            (&args.category, &mut self.event.category),
            (&args.event_type, &mut self.event.event_type),
            (&args.title, &mut self.event.title),
            (&args.text, &mut self.event.text),
            (&args.identifier, &mut self.event.identifier),
            (&args.link_title, &mut self.event.link_title),
            (&args.link_url, &mut self.event.link_url),
        ];

        for (value, field) in overrides {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }

        if let Some(tags) = &args.tags {
            self.event.tags.clone_from(tags);
        }

        if args.tls_skip_verify {
            self.tls_skip_verify = true;
        }

        if args.timeout.is_some() {
            self.timeout = args.timeout;
        }
    }

    /// Validate that the connection settings are present and well-formed
    ///
    /// Templates are not checked here; they are compiled when first evaluated.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL or key is missing, or the URL is not absolute
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(app_err!("api_url must be set"));
        }

        let url = Url::parse(&self.api_url).map_err(|e| app_err!("api_url '{}' is not a valid URL: {e}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(app_err!("api_url '{}' must use http or https", self.api_url));
        }

        if self.api_key.trim().is_empty() {
            return Err(app_err!("api_key must be set"));
        }

        Ok(())
    }

    #[must_use]
    pub const fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            tls_skip_verify: self.tls_skip_verify,
            timeout: self.timeout,
        }
    }
}

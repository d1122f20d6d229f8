//! HTTP client for the StackState agent receiver

use super::SubmitError;
use crate::payload::{EventPayload, MetricSeries};
use core::time::Duration;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;

const LOG_TARGET: &str = "    submit";

/// Path of the receiver's event intake API
pub const EVENT_ENDPOINT: &str = "receiver/stsAgent/intake";

/// Path of the receiver's metric series API
pub const METRIC_ENDPOINT: &str = "receiver/stsAgent/api/v1/series";

const USER_AGENT: &str = concat!("sts-emitter/", env!("CARGO_PKG_VERSION"));

/// Transport settings for [`Client`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Accept any server certificate
    pub tls_skip_verify: bool,

    /// Per-request timeout; `None` leaves requests unbounded
    pub timeout: Option<Duration>,
}

/// Posts payloads to a receiver
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    /// Create a client for the receiver at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(base_url: &str, api_key: impl Into<String>, options: TransportOptions) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

        if options.tls_skip_verify {
            log::warn!(target: LOG_TARGET, "TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.strip_suffix('/').unwrap_or(base_url).to_string(),
            api_key: api_key.into(),
        })
    }

    /// The receiver URL with any trailing slash removed
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint, without the API key
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Post an event payload
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the receiver does not answer 200 OK
    pub async fn send_event(&self, payload: &EventPayload) -> Result<(), SubmitError> {
        let body = self.post(EVENT_ENDPOINT, payload).await?;
        log::info!(target: LOG_TARGET, "Sent event: {body}");
        Ok(())
    }

    /// Post a metric series
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the receiver does not answer 200 OK
    pub async fn send_metric(&self, payload: &MetricSeries) -> Result<(), SubmitError> {
        let body = self.post(METRIC_ENDPOINT, payload).await?;
        log::info!(target: LOG_TARGET, "Sent metric: {body}");
        Ok(())
    }

    /// Serialize and post a payload, returning the body that was sent
    async fn post<T: Serialize>(&self, endpoint: &'static str, payload: &T) -> Result<String, SubmitError> {
        let body = serde_json::to_string(payload)?;
        let url = self.endpoint_url(endpoint);
        log::debug!(target: LOG_TARGET, "Posting to {url}: {body}");

        let response = match self
            .client
            .post(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body.clone())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                // the URL carries the API key
                let source = e.without_url();
                log::error!(target: LOG_TARGET, "Could not post payload to {url}: {source}. Payload: {body}");
                return Err(SubmitError::Transport { endpoint, source });
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let response_body = response.text().await.unwrap_or_else(|e| format!("<unreadable response body: {e}>"));
            log::error!(
                target: LOG_TARGET,
                "Failed to post payload to {url}. Status '{status}'. Response: {response_body}. Payload: {body}"
            );
            return Err(SubmitError::Status {
                endpoint,
                status,
                body: response_body,
            });
        }

        Ok(body)
    }
}

use core::fmt;
use reqwest::StatusCode;

/// Reasons a payload could not be delivered
#[derive(Debug)]
pub enum SubmitError {
    /// The payload could not be serialized to JSON
    Serialize(serde_json::Error),

    /// The request never produced a response (DNS, TLS, connection, timeout)
    Transport { endpoint: &'static str, source: reqwest::Error },

    /// The receiver answered with something other than 200 OK
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "could not serialize payload: {e}"),
            Self::Transport { endpoint, source } => write!(f, "could not reach '{endpoint}': {source}"),
            Self::Status { endpoint, status, body } => {
                write!(f, "'{endpoint}' rejected the payload with status '{status}'. Response: {body}")
            }
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(e) => Some(e),
            Self::Transport { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SubmitError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e)
    }
}

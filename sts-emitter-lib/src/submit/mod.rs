//! Submission of payloads to the StackState agent receiver
//!
//! [`Client`] owns an explicitly configured `reqwest` client and posts JSON
//! payloads to `<base>/<endpoint>?api_key=<key>`. Only HTTP 200 counts as
//! success. Every request body is logged, and failure responses are captured
//! in [`SubmitError`] so callers can decide whether a failure is fatal.
//!
//! There is no retry: each payload is posted exactly once.

mod client;
mod submit_error;

pub use client::{Client, EVENT_ENDPOINT, METRIC_ENDPOINT, TransportOptions};
pub use submit_error::SubmitError;

//! Wire payloads accepted by the StackState agent receiver
//!
//! [`EventPayload`] is posted to the intake endpoint and [`MetricSeries`] to
//! the series endpoint. Field names follow the receiver's JSON schema, so the
//! Rust names are mapped with `serde(rename)` where they differ.

mod event;
mod metric;

pub use event::{EVENT_KEY, Empty, Event, EventContext, EventLink, EventPayload};
pub use metric::{GAUGE, Metric, MetricSeries, Point};

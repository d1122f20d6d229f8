//! Derives a presence metric from a bound event

use crate::payload::{EventPayload, GAUGE, Metric, MetricSeries, Point};

const LOG_TARGET: &str = "   binding";

/// Build a metric series recording that the event happened
///
/// The series has a single point with value `1` at the payload's collection
/// timestamp. Its tags are the event's `key:value` tags plus `event_type:` and
/// `identifier:` tags, and its host is the event's element identifier.
///
/// Returns `None` when `name` is empty, or when the event is not bound to a
/// topology element since the metric would have no host.
#[must_use]
pub fn derive_metric(name: &str, payload: &EventPayload) -> Option<MetricSeries> {
    if name.is_empty() {
        return None;
    }

    let event = payload.event()?;
    let Some(identifier) = event.first_element_identifier() else {
        log::warn!(target: LOG_TARGET, "Event has no element identifier, metric '{name}' will not be sent");
        return None;
    };

    let tags = event
        .tags
        .iter()
        .filter(|tag| tag.contains(':'))
        .cloned()
        .chain([format!("event_type:{}", event.event_type), format!("identifier:{identifier}")])
        .collect();

    Some(MetricSeries {
        series: vec![Metric {
            name: name.to_string(),
            points: vec![Point(payload.collection_timestamp, 1.0)],
            tags,
            host: identifier.to_string(),
            metric_type: GAUGE.to_string(),
            interval: 0,
            source_type_name: event.source_type_name.clone(),
        }],
    })
}

//! Binds a template set to an evaluation context to produce an event payload

use super::{BindError, TemplateSet};
use crate::expr::Activation;
use crate::payload::{Event, EventContext, EventLink, EventPayload};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Evaluate every template and assemble the event payload
///
/// Templates are evaluated in a fixed order: origin host, type, title, text,
/// tags, category, identifier, link title, link URL. The first failure aborts
/// the bind; there is no partial result.
///
/// # Errors
///
/// Returns a [`BindError`] naming the first field whose template failed
pub fn bind_event(activation: &Activation<'_>, templates: &TemplateSet, now: DateTime<Utc>) -> Result<EventPayload, BindError> {
    let collection_timestamp = now.timestamp();

    let internal_hostname = bind(activation, "origin_host", &templates.origin_host)?;
    let event_type = bind(activation, "type", &templates.event_type)?;
    let title = bind(activation, "title", &templates.title)?;
    let text = bind(activation, "text", &templates.text)?;

    let tags = templates
        .tags
        .iter()
        .enumerate()
        .map(|(i, tag)| bind(activation, format!("tags[{i}]"), tag))
        .collect::<Result<Vec<_>, _>>()?;

    let category = bind(activation, "category", &templates.category)?;

    let identifier = bind(activation, "identifier", &templates.identifier)?;
    let element_identifiers = if identifier.is_empty() { Vec::new() } else { vec![identifier] };

    let link_title = bind(activation, "link_title", &templates.link_title)?;
    let link_url = bind(activation, "link_url", &templates.link_url)?;
    let source_links = if link_title.is_empty() || link_url.is_empty() {
        Vec::new()
    } else {
        vec![EventLink {
            title: link_title,
            url: link_url,
        }]
    };

    let event = Event {
        context: EventContext {
            category,
            data: BTreeMap::new(),
            element_identifiers,
            source: templates.source.clone(),
            source_links,
        },
        event_type,
        title,
        text,
        source_type_name: templates.source.clone(),
        tags,
        timestamp: collection_timestamp,
    };

    Ok(EventPayload::new(collection_timestamp, internal_hostname, event))
}

/// Evaluate the metric name template
///
/// # Errors
///
/// Returns a [`BindError`] for the `metric_name` field if evaluation fails
pub fn bind_metric_name(activation: &Activation<'_>, template: &str) -> Result<String, BindError> {
    bind(activation, "metric_name", template)
}

fn bind(activation: &Activation<'_>, field: impl Into<String>, template: &str) -> Result<String, BindError> {
    activation.eval_string(template).map_err(|e| BindError::new(field, e))
}

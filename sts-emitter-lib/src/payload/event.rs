use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which the bound event is filed in [`EventPayload::events`]
pub const EVENT_KEY: &str = "emitter_event";

/// The body posted to the agent intake endpoint
///
/// The receiving schema requires `metrics`, `service_checks`, `health` and
/// `topologies` to be present even though this tool never fills them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Epoch timestamp in seconds
    pub collection_timestamp: i64,

    /// The hostname sending the data
    #[serde(rename = "internalHostname")]
    pub internal_hostname: String,

    pub events: BTreeMap<String, Vec<Event>>,

    pub metrics: Vec<Empty>,
    pub service_checks: Vec<Empty>,
    pub health: Vec<Empty>,
    pub topologies: Vec<Empty>,
}

impl EventPayload {
    /// Create a payload carrying a single event
    #[must_use]
    pub fn new(collection_timestamp: i64, internal_hostname: String, event: Event) -> Self {
        Self {
            collection_timestamp,
            internal_hostname,
            events: BTreeMap::from([(EVENT_KEY.to_string(), vec![event])]),
            metrics: Vec::new(),
            service_checks: Vec::new(),
            health: Vec::new(),
            topologies: Vec::new(),
        }
    }

    /// The bound event, if the payload carries one
    #[must_use]
    pub fn event(&self) -> Option<&Event> {
        self.events.get(EVENT_KEY).and_then(|events| events.first())
    }
}

/// A single event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub context: EventContext,
    pub event_type: String,

    #[serde(rename = "msg_title")]
    pub title: String,

    #[serde(rename = "msg_text")]
    pub text: String,

    pub source_type_name: String,
    pub tags: Vec<String>,

    /// Epoch timestamp in seconds
    pub timestamp: i64,
}

impl Event {
    /// The identifier of the topology element this event is bound to
    #[must_use]
    pub fn first_element_identifier(&self) -> Option<&str> {
        self.context.element_identifiers.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// One of Activities, Alerts, Anomalies, Changes or Others
    pub category: String,

    /// Key/value details about the event; always empty
    pub data: BTreeMap<String, String>,

    /// Topology element(s) the event relates to
    pub element_identifiers: Vec<String>,

    /// The system the event originates from
    pub source: String,

    pub source_links: Vec<EventLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLink {
    pub title: String,
    pub url: String,
}

/// Placeholder element for the required-but-unused collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

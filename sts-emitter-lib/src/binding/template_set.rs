use serde::{Deserialize, Serialize};

/// The configured templates for each field of an event
///
/// Each value is CEL expression text. Literal text must be written as a CEL
/// string literal (`'Alerts'`), except `source` which is copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSet {
    /// Bound to the payload's `internalHostname`
    pub origin_host: String,

    /// Copied as-is into `source_type_name` and `context.source`; never evaluated
    pub source: String,

    pub category: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub title: String,
    pub text: String,

    /// Topology element identifier; an empty result means the event is not bound to an element
    pub identifier: String,

    pub link_title: String,
    pub link_url: String,

    /// Each entry is evaluated independently, in order
    pub tags: Vec<String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            origin_host: "'localhost'".to_string(),
            source: "emitter".to_string(),
            category: "'Alerts'".to_string(),
            event_type: "'Emitter Event'".to_string(),
            title: String::new(),
            text: String::new(),
            identifier: String::new(),
            link_title: String::new(),
            link_url: String::new(),
            tags: Vec::new(),
        }
    }
}

impl TemplateSet {
    /// Every evaluated template paired with the name of the field it binds
    ///
    /// `source` is omitted since it is never evaluated.
    pub fn expressions(&self) -> impl Iterator<Item = (String, &str)> {
        [
            ("origin_host", self.origin_host.as_str()),
            ("type", self.event_type.as_str()),
            ("title", self.title.as_str()),
            ("text", self.text.as_str()),
            ("category", self.category.as_str()),
            ("identifier", self.identifier.as_str()),
            ("link_title", self.link_title.as_str()),
            ("link_url", self.link_url.as_str()),
        ]
        .into_iter()
        .map(|(name, template)| (name.to_string(), template))
        .chain(self.tags.iter().enumerate().map(|(i, tag)| (format!("tags[{i}]"), tag.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = TemplateSet::default();
        assert_eq!(set.origin_host, "'localhost'");
        assert_eq!(set.source, "emitter");
        assert_eq!(set.category, "'Alerts'");
        assert_eq!(set.event_type, "'Emitter Event'");
        assert!(set.title.is_empty());
        assert!(set.tags.is_empty());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let set: TemplateSet = toml::from_str(
            r#"
type = "'Deployment'"
tags = ["'env:prod'", "body.team"]
"#,
        )
        .unwrap();

        assert_eq!(set.event_type, "'Deployment'");
        assert_eq!(set.tags, vec!["'env:prod'", "body.team"]);
        assert_eq!(set.origin_host, "'localhost'");
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<TemplateSet, _> = toml::from_str("titel = \"'typo'\"");
        assert!(result.is_err(), "misspelled field should be rejected");
    }

    #[test]
    fn test_expressions_skip_source_and_name_tags() {
        let set = TemplateSet {
            tags: vec!["'a'".to_string(), "'b'".to_string()],
            ..TemplateSet::default()
        };

        let names: Vec<String> = set.expressions().map(|(name, _)| name).collect();
        assert!(!names.contains(&"source".to_string()));
        assert_eq!(names[names.len() - 2..], ["tags[0]".to_string(), "tags[1]".to_string()]);
        assert_eq!(names.len(), 10);
    }
}

use serde::{Deserialize, Serialize};

/// Metric type reported for derived series
pub const GAUGE: &str = "gauge";

/// The body posted to the metric series endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub series: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "metric")]
    pub name: String,
    pub points: Vec<Point>,
    pub tags: Vec<String>,
    pub host: String,

    #[serde(rename = "type")]
    pub metric_type: String,

    pub interval: u32,
    pub source_type_name: String,
}

/// A `(timestamp, value)` sample, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point(pub i64, pub f64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_serializes_as_array() {
        let value = serde_json::to_value(Point(1_700_000_000, 1.0)).unwrap();
        assert_eq!(value, json!([1_700_000_000, 1.0]));
    }

    #[test]
    fn test_wire_format() {
        let series = MetricSeries {
            series: vec![Metric {
                name: "events".to_string(),
                points: vec![Point(10, 1.0)],
                tags: vec!["event_type:x".to_string()],
                host: "urn:a".to_string(),
                metric_type: GAUGE.to_string(),
                interval: 0,
                source_type_name: "emitter".to_string(),
            }],
        };

        let value = serde_json::to_value(&series).unwrap();
        assert_eq!(
            value,
            json!({
                "series": [{
                    "metric": "events",
                    "points": [[10, 1.0]],
                    "tags": ["event_type:x"],
                    "host": "urn:a",
                    "type": "gauge",
                    "interval": 0,
                    "source_type_name": "emitter"
                }]
            })
        );
    }
}

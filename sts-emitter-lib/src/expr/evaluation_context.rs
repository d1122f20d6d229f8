use crate::Result;
use ohno::{IntoAppError, app_err};
use serde_json::{Map, Value};

const LOG_TARGET: &str = "      expr";

/// The runtime input that templates are evaluated against, exposed to expressions as `body`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    body: Map<String, Value>,
}

impl EvaluationContext {
    #[must_use]
    pub const fn new(body: Map<String, Value>) -> Self {
        Self { body }
    }

    /// Parse the event body from JSON text
    ///
    /// Absent or blank text, or a JSON `null`, yields an empty body rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or is neither a JSON object nor `null`
    pub fn parse(text: Option<&str>) -> Result<Self> {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            log::info!(target: LOG_TARGET, "No event body supplied, using an empty map");
            return Ok(Self::default());
        };

        let value: Value = serde_json::from_str(text).into_app_err("parsing the event body as JSON")?;
        Self::try_from(value)
    }

    #[must_use]
    pub const fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl TryFrom<Value> for EvaluationContext {
    type Error = ohno::AppError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(body) => Ok(Self { body }),
            Value::Null => {
                log::info!(target: LOG_TARGET, "Event body is null, using an empty map");
                Ok(Self::default())
            }
            other => Err(app_err!("the event body must be a JSON object, got '{}'", json_kind(&other))),
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

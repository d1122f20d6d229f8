use crate::expr::EvalError;
use core::fmt;

/// A template field that could not be bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindError {
    field: String,
    source: EvalError,
}

impl BindError {
    #[must_use]
    pub fn new(field: impl Into<String>, source: EvalError) -> Self {
        Self { field: field.into(), source }
    }

    /// Name of the field that failed, such as `title` or `tags[2]`
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn eval_error(&self) -> &EvalError {
        &self.source
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not bind field '{}': {}", self.field, self.source)
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

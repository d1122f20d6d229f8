use core::fmt;

/// Reasons a single template expression could not produce a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The expression is not valid CEL syntax
    Compile { expression: String, message: String },

    /// The expression parsed but references a variable or function the environment does not declare
    Check { expression: String, message: String },

    /// The expression failed while executing (missing map key, bad operand types, ...)
    Runtime { expression: String, message: String },

    /// The expression evaluated successfully but not to a string
    TypeMismatch { expression: String, found: String },
}

impl EvalError {
    /// The expression text that failed
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Compile { expression, .. }
            | Self::Check { expression, .. }
            | Self::Runtime { expression, .. }
            | Self::TypeMismatch { expression, .. } => expression,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { expression, message } => write!(f, "could not parse expression '{expression}': {message}"),
            Self::Check { expression, message } => write!(f, "expression '{expression}' failed checking: {message}"),
            Self::Runtime { expression, message } => write!(f, "could not evaluate expression '{expression}': {message}"),
            Self::TypeMismatch { expression, found } => {
                write!(f, "expression '{expression}' did not return a string, got '{found}' instead")
            }
        }
    }
}

impl std::error::Error for EvalError {}

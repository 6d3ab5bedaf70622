use thiserror::Error;

/// Error taxonomy for the core contracts. Every rejected operation names
/// the phase, field, or weight responsible so the caller can correct the
/// input without trial and error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },
    #[error("invariant violated at phase {phase}: {message}")]
    Invariant { phase: usize, message: String },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invariant(phase: usize, message: impl Into<String>) -> Self {
        CoreError::Invariant {
            phase,
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }

    /// Validation and invariant failures are caller-correctable; the rest
    /// are terminal for the request.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            CoreError::Validation { .. } | CoreError::Invariant { .. }
        )
    }
}

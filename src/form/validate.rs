use super::data::FormData;
use thiserror::Error;

/// A field the host's validation layer refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Field validation owned by the host UI (required, pattern, ...).
pub trait FieldValidator: Send + Sync {
    fn validate(&self, data: &FormData) -> Result<(), Vec<FieldError>>;
}

impl<F> FieldValidator for F
where
    F: Fn(&FormData) -> Result<(), Vec<FieldError>> + Send + Sync,
{
    fn validate(&self, data: &FormData) -> Result<(), Vec<FieldError>> {
        self(data)
    }
}

/// Validator for hosts that validate before calling the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl FieldValidator for AcceptAll {
    fn validate(&self, _data: &FormData) -> Result<(), Vec<FieldError>> {
        Ok(())
    }
}

use thiserror::Error;

use golden_catalog::DESCRIPTION_FIELD;
use golden_core::DomainError;

/// Validation failure scoped to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Visible failures of catalog type operations.
///
/// Session problems are not errors here: they turn the call into a no-op
/// (see [`SkipReason`](crate::SkipReason)) and the route guard redirects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogTypeError {
    /// Rejected locally before any network call.
    #[error("{}", .0.message)]
    Validation(FieldError),

    /// The catalog service call failed.
    #[error("{0}")]
    Transport(String),
}

impl CatalogTypeError {
    pub fn message(&self) -> &str {
        match self {
            CatalogTypeError::Validation(field) => &field.message,
            CatalogTypeError::Transport(msg) => msg,
        }
    }

    /// Map a description validation failure onto the description field.
    pub(crate) fn description(err: DomainError) -> Self {
        CatalogTypeError::Validation(FieldError {
            field: DESCRIPTION_FIELD,
            message: err.message().to_string(),
        })
    }
}

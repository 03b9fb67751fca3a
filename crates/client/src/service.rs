use async_trait::async_trait;
use thiserror::Error;

use golden_catalog::{CatalogType, CatalogTypeId, CatalogTypeInput};

/// Failure reported by the remote catalog API.
///
/// The message is shown to the user as-is (a generic fallback replaces it
/// only when blank).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Contract required from the remote catalog type API.
///
/// `create`/`update` may succeed without returning the stored entity
/// (`Ok(None)`); the controller then builds a provisional one.
#[async_trait]
pub trait CatalogTypeService: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<CatalogType>, ServiceError>;

    async fn create(&self, input: &CatalogTypeInput) -> Result<Option<CatalogType>, ServiceError>;

    async fn update(
        &self,
        id: CatalogTypeId,
        input: &CatalogTypeInput,
    ) -> Result<Option<CatalogType>, ServiceError>;

    /// Logically retire a type. There is no hard delete.
    async fn deactivate(&self, id: CatalogTypeId) -> Result<(), ServiceError>;
}

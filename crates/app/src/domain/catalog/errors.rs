//! Catalog service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("product already exists")]
    AlreadyExists,

    #[error("product not found")]
    NotFound,

    #[error("event service not found")]
    EventServiceNotFound,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CatalogServiceError {
    fn from(error: StoreError) -> Self {
        if error.is_unique_violation() {
            return Self::AlreadyExists;
        }

        Self::Store(error)
    }
}

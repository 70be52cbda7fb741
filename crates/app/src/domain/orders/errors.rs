//! Orders service errors.

use garland::orders::OrderError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Status(#[from] OrderError),

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        if error.is_unique_violation() {
            return Self::AlreadyExists;
        }

        Self::Store(error)
    }
}

//! Discounts service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DiscountsServiceError {
    #[error("discount code already exists")]
    AlreadyExists,

    #[error("discount code not found")]
    NotFound,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for DiscountsServiceError {
    fn from(error: StoreError) -> Self {
        if error.is_unique_violation() {
            return Self::AlreadyExists;
        }

        Self::Store(error)
    }
}

//! Inquiries service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum InquiriesServiceError {
    #[error("Please enter your {0}")]
    MissingField(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("storage error")]
    Store(#[from] StoreError),
}

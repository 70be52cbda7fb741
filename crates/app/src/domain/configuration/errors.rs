//! Configuration service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ConfigurationServiceError {
    #[error("storage error")]
    Store(#[from] StoreError),
}

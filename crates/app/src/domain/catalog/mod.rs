//! Catalog

mod errors;
pub mod service;

pub use errors::CatalogServiceError;
pub use service::{CatalogService, MockCatalogService, StoreCatalogService};

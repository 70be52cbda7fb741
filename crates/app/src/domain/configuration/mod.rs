//! Store configuration: delivery settings and timing surcharges

mod errors;
pub mod records;
pub mod service;

pub use errors::ConfigurationServiceError;
pub use service::{ConfigurationService, MockConfigurationService, StoreConfigurationService};

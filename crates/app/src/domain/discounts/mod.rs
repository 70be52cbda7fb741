//! Discount codes

mod errors;
pub mod service;

pub use errors::DiscountsServiceError;
pub use service::{DiscountsService, MockDiscountsService, StoreDiscountsService};

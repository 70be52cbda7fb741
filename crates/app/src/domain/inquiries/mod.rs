//! Event inquiries

mod errors;
pub mod records;
pub mod service;

pub use errors::InquiriesServiceError;
pub use service::{InquiriesService, MockInquiriesService, StoreInquiriesService};

//! Garland Domain Concerns

pub mod catalog;
pub mod configuration;
pub mod discounts;
pub mod inquiries;
pub mod orders;

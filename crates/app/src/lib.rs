//! Storefront services for Garland: catalog, checkout, payments and the back
//! office, backed by a hosted data store.

pub mod admin;
pub mod auth;
pub mod blobs;
pub mod checkout;
pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod payments;
pub mod store;

#[cfg(test)]
mod test;

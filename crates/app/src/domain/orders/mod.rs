//! Orders and gift cards

mod errors;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::{MockOrdersService, OrdersService, StoreOrdersService};

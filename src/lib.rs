//! Garland
//!
//! Garland prices and composes orders for a Christmas decoration and event
//! services storefront: tree rentals, decorations, gift cards and event
//! bookings, from the customer's first selection to a paid order.

pub mod catalog;
pub mod checkout;
pub mod customers;
pub mod delivery;
pub mod discounts;
pub mod gift_cards;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod receipt;
pub mod settings;

//! Back-office authentication.

mod errors;
mod models;
mod service;

pub use errors::AuthError;
pub use models::{AdminSession, SESSION_LIFETIME};
pub use service::{Auth, MockAuth, StaticAuth};

//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::auth::{AdminSession, AuthError};

/// Single administrator account configured at startup.
#[derive(Debug, Clone)]
pub struct StaticAuth {
    email: String,
    password: String,
}

impl StaticAuth {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Auth for StaticAuth {
    #[tracing::instrument(name = "auth.service.sign_in", skip(self, password), err)]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        let email_matches = email.trim().eq_ignore_ascii_case(&self.email);

        if !email_matches || password != self.password || self.password.is_empty() {
            warn!("rejected admin sign in");

            return Err(AuthError::InvalidCredentials);
        }

        info!("admin signed in");

        Ok(AdminSession::new(self.email.clone(), Timestamp::now()))
    }
}

#[automock]
#[async_trait]
pub trait Auth: Send + Sync {
    /// Exchange credentials for an admin session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, AuthError>;
}

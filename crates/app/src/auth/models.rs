//! Auth models.

use jiff::{SignedDuration, Timestamp};

use crate::auth::AuthError;

/// How long a sign-in stays valid.
pub const SESSION_LIFETIME: SignedDuration = SignedDuration::from_hours(8);

/// Proof that an administrator signed in. Only [`Auth`](crate::auth::Auth)
/// implementations can create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    email: String,
    signed_in_at: Timestamp,
}

impl AdminSession {
    pub(crate) fn new(email: impl Into<String>, signed_in_at: Timestamp) -> Self {
        Self {
            email: email.into(),
            signed_in_at,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn signed_in_at(&self) -> Timestamp {
        self.signed_in_at
    }

    /// Fail once the session is older than [`SESSION_LIFETIME`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`].
    pub fn ensure_active(&self, now: Timestamp) -> Result<(), AuthError> {
        if now.duration_since(self.signed_in_at) > SESSION_LIFETIME {
            return Err(AuthError::SessionExpired);
        }

        Ok(())
    }
}

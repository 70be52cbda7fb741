//! Card payments.

use async_trait::async_trait;
use garland::prices::Price;
use mockall::automock;
use thiserror::Error;

pub mod stripe;

pub use stripe::{StripeConfig, StripeGateway};

/// Message shown when the gateway gives no reason of its own.
pub const GENERIC_FAILURE: &str = "Payment failed, please try again";

/// Secret handed back when a payment intent is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Payment intent id the secret belongs to (`pi_123_secret_abc` → `pi_123`).
    pub fn payment_intent_id(&self) -> &str {
        self.0
            .split_once("_secret_")
            .map_or(self.0.as_str(), |(id, _)| id)
    }
}

/// Card the customer pays with, as a tokenised payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub payment_method: String,
}

/// A successful card payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub payment_intent_id: String,
}

/// Payment failures. Messages are shown to the customer.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The gateway refused the payment and said why.
    #[error("{0}")]
    Declined(String),

    /// The gateway refused the payment without a reason.
    #[error("{}", GENERIC_FAILURE)]
    Failed,

    /// The gateway could not be reached or answered with something unreadable.
    #[error("{}", GENERIC_FAILURE)]
    Http(#[from] reqwest::Error),
}

impl PaymentError {
    /// Failure carrying the gateway's message, when it gave one.
    pub fn from_gateway(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => Self::Declined(message),
            Some(_) | None => Self::Failed,
        }
    }
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for `amount`, charged in whole cents.
    async fn create_payment_intent(&self, amount: Price) -> Result<ClientSecret, PaymentError>;

    /// Confirm the intent behind `secret` with the customer's card.
    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, PaymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_yields_intent_id() {
        let secret = ClientSecret::new("pi_3Nabc_secret_XYZ");

        assert_eq!(secret.payment_intent_id(), "pi_3Nabc");
    }

    #[test]
    fn gateway_message_is_kept_verbatim() {
        let error = PaymentError::from_gateway(Some("Your card has insufficient funds.".to_string()));

        assert_eq!(error.to_string(), "Your card has insufficient funds.");
    }

    #[test]
    fn missing_message_falls_back_to_generic_text() {
        assert_eq!(PaymentError::from_gateway(None).to_string(), GENERIC_FAILURE);
        assert_eq!(
            PaymentError::from_gateway(Some("  ".to_string())).to_string(),
            GENERIC_FAILURE
        );
    }
}

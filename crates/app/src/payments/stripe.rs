//! Stripe payment intents over the REST API.

use async_trait::async_trait;
use garland::prices::Price;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{info, warn};

use super::{CardDetails, ClientSecret, PaymentConfirmation, PaymentError, PaymentGateway};

/// Configuration for the Stripe API.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// API base URL, normally `"https://api.stripe.com"`.
    pub api_url: String,

    /// Secret API key.
    pub secret_key: String,

    /// ISO currency code, lowercase.
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct StripeGateway {
    config: StripeConfig,
    http: Client,
}

impl StripeGateway {
    #[must_use]
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(&self, amount: Price) -> Result<ClientSecret, PaymentError> {
        let form = [
            ("amount", amount.cents().to_string()),
            ("currency", self.config.currency.clone()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .http
            .post(self.url("payment_intents"))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        let intent: IntentResponse = read(response).await?;

        info!(payment_intent_id = %intent.id, amount = %amount, "created payment intent");

        intent
            .client_secret
            .map(ClientSecret::new)
            .ok_or(PaymentError::Failed)
    }

    async fn confirm_card_payment(
        &self,
        secret: &ClientSecret,
        card: &CardDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let path = format!("payment_intents/{}/confirm", secret.payment_intent_id());
        let form = [("payment_method", card.payment_method.as_str())];

        let response = self
            .http
            .post(self.url(&path))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        let intent: IntentResponse = read(response).await?;

        if intent.status != "succeeded" {
            warn!(payment_intent_id = %intent.id, status = %intent.status, "payment not completed");

            return Err(PaymentError::from_gateway(
                intent.last_payment_error.and_then(|error| error.message),
            ));
        }

        Ok(PaymentConfirmation {
            payment_intent_id: intent.id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    status: String,
    client_secret: Option<String>,
    last_payment_error: Option<GatewayError>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: GatewayError,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    message: Option<String>,
}

async fn read(response: Response) -> Result<IntentResponse, PaymentError> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        warn!(%status, "payment gateway request failed");

        let message = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.error.message);

        return Err(PaymentError::from_gateway(message));
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_message_is_extracted() -> anyhow::Result<()> {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"error": {"type": "card_error", "message": "Your card was declined."}}"#,
        )?;

        let error = PaymentError::from_gateway(body.error.message);

        assert_eq!(error.to_string(), "Your card was declined.");

        Ok(())
    }

    #[test]
    fn urls_join_api_base() {
        let gateway = StripeGateway::new(StripeConfig {
            api_url: "https://api.stripe.com/".to_string(),
            secret_key: "sk_test".to_string(),
            currency: "usd".to_string(),
        });

        assert_eq!(
            gateway.url("payment_intents"),
            "https://api.stripe.com/v1/payment_intents"
        );
    }
}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_GATEWAY_BASE: &str = "https://api.stripe.com";

const CURRENCY: &str = "usd";

/// Request to open a payment intent with the remote processor.
#[derive(Debug, Clone)]
pub struct CreateIntent {
    /// Smallest currency unit; passed through to the processor unchanged.
    pub amount: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Handle returned by the processor; `client_secret` is what the browser
/// needs to confirm the payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIntent {
    #[serde(rename = "id")]
    pub intent_id: String,
    pub client_secret: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway declined request ({status}): {message}")]
    Declined { status: u16, message: String },
    #[error("gateway returned malformed payload: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Text safe to surface to API clients. Decline reasons are meant for
    /// the paying user; transport and parse detail stays in the log.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Declined { message, .. } => message.clone(),
            GatewayError::Http(_) | GatewayError::Malformed(_) => {
                "payment gateway request failed".to_string()
            }
        }
    }
}

/// What the order lifecycle needs from a payment processor.
///
/// The app state holds this as a trait object so tests and local runs can
/// swap in [`StubGateway`] without touching handler code.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, request: CreateIntent) -> Result<CreatedIntent, GatewayError>;
}

/// Stripe-backed implementation speaking the payment-intents endpoint.
pub struct StripeGateway {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into(),
        }
    }
}

#[derive(Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: CreateIntent) -> Result<CreatedIntent, GatewayError> {
        let mut form = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), CURRENCY.to_string()),
            ("payment_method_types[]".to_string(), "card".to_string()),
        ];
        if let Some(name) = request.name {
            form.push(("metadata[name]".to_string(), name));
        }
        if let Some(email) = request.email {
            form.push(("metadata[email]".to_string(), email));
        }
        if let Some(address) = request.address {
            form.push(("metadata[address]".to_string(), address));
        }

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| "payment intent creation rejected".to_string());
            return Err(GatewayError::Declined {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CreatedIntent>()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))
    }
}

/// Deterministic in-process gateway for tests and local development.
#[derive(Debug, Default)]
pub struct StubGateway;

impl StubGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(&self, request: CreateIntent) -> Result<CreatedIntent, GatewayError> {
        let intent_id = format!("pi_stub_{}", request.amount);
        let client_secret = format!("{intent_id}_secret");
        Ok(CreatedIntent {
            intent_id,
            client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request(amount: i64) -> CreateIntent {
        CreateIntent {
            amount,
            name: Some("Jo Doe".to_string()),
            email: Some("jo@example.com".to_string()),
            address: Some("12 High St".to_string()),
        }
    }

    #[tokio::test]
    async fn posts_form_encoded_intent_and_returns_the_secret() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/payment_intents")
                .header("authorization", "Bearer sk_test_123")
                .body_contains("amount=1299")
                .body_contains("currency=usd")
                .body_contains("payment_method_types%5B%5D=card");
            then.status(200).json_body(serde_json::json!({
                "id": "pi_42",
                "client_secret": "pi_42_secret_xyz",
                "status": "requires_payment_method"
            }));
        });

        let gateway = StripeGateway::new("sk_test_123", server.base_url());
        let intent = gateway.create_intent(request(1299)).await.unwrap();

        mock.assert();
        assert_eq!(intent.intent_id, "pi_42");
        assert_eq!(intent.client_secret, "pi_42_secret_xyz");
    }

    #[tokio::test]
    async fn decline_surfaces_the_processor_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(402).json_body(serde_json::json!({
                "error": { "message": "Your card was declined.", "type": "card_error" }
            }));
        });

        let gateway = StripeGateway::new("sk_test_123", server.base_url());
        let err = gateway.create_intent(request(500)).await.unwrap_err();

        match &err {
            GatewayError::Declined { status, message } => {
                assert_eq!(*status, 402);
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("expected Declined, got {other:?}"),
        }
        assert_eq!(err.client_message(), "Your card was declined.");
    }

    #[tokio::test]
    async fn decline_without_a_message_still_reports_rejection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(500).body("upstream exploded");
        });

        let gateway = StripeGateway::new("sk_test_123", server.base_url());
        let err = gateway.create_intent(request(500)).await.unwrap_err();

        assert!(matches!(err, GatewayError::Declined { status: 500, .. }));
        assert_eq!(err.client_message(), "payment intent creation rejected");
    }

    #[tokio::test]
    async fn malformed_success_body_is_not_a_decline() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(200).body("not json");
        });

        let gateway = StripeGateway::new("sk_test_123", server.base_url());
        let err = gateway.create_intent(request(500)).await.unwrap_err();

        assert!(matches!(err, GatewayError::Malformed(_)));
        assert_eq!(err.client_message(), "payment gateway request failed");
    }

    #[tokio::test]
    async fn stub_gateway_is_deterministic() {
        let gateway = StubGateway::new();
        let intent = gateway.create_intent(request(500)).await.unwrap();
        assert_eq!(intent.intent_id, "pi_stub_500");
        assert_eq!(intent.client_secret, "pi_stub_500_secret");
    }
}

// ── Payment adapter ──
//
// The client-side half of card payments: confirming an intent with its
// client secret, tokenizing a card into a payment method, and turning a
// checkout session into a hosted-checkout URL. `PaymentGateway` is the seam;
// `StripeGateway` talks to Stripe's publishable-key endpoints.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use soulseer_api::TransportConfig;
use soulseer_api::models::{CheckoutSession, IntentStatus, PaymentIntentRef, PaymentMethod};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::StripeConfig;
use crate::error::CoreError;

// ── Types ────────────────────────────────────────────────────────────

/// Failure reported by the payment SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
    pub code: Option<String>,
    pub decline_code: Option<String>,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            decline_code: None,
        }
    }
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        CoreError::PaymentDeclined {
            message: err.message,
            code: err.decline_code.or(err.code),
        }
    }
}

/// Raw card data handed to the SDK for tokenization. Never stored.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: SecretString,
    pub exp_month: u32,
    pub exp_year: u32,
    pub cvc: SecretString,
}

/// A client-side card confirmation that reached `succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardConfirmation {
    pub payment_intent_id: String,
    pub status: IntentStatus,
}

impl CardConfirmation {
    /// Accept only intents that succeeded; anything else is reported as
    /// `Payment status: <status>`.
    pub fn from_intent(intent: PaymentIntentRef) -> Result<Self, GatewayError> {
        match intent.status {
            IntentStatus::Succeeded => Ok(Self {
                payment_intent_id: intent.id,
                status: IntentStatus::Succeeded,
            }),
            other => Err(GatewayError::new(format!("Payment status: {other}"))),
        }
    }
}

/// A checkout session together with the hosted page to send the buyer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRedirect {
    pub session: CheckoutSession,
    pub url: Url,
}

/// Client-side payment SDK surface.
///
/// Every call returns `Result`, so callers must handle the SDK error before
/// they can look at the payload.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirm a payment intent with its client secret.
    async fn confirm_card_payment(
        &self,
        client_secret: &SecretString,
    ) -> Result<PaymentIntentRef, GatewayError>;

    /// Tokenize a card into a payment method.
    async fn create_payment_method(&self, card: &CardDetails)
    -> Result<PaymentMethod, GatewayError>;

    /// Resolve the hosted checkout page for a session.
    async fn redirect_to_checkout(&self, session_id: &str) -> Result<Url, GatewayError>;
}

// ── Stripe ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    decline_code: Option<String>,
}

/// `PaymentGateway` backed by Stripe's REST API, authenticated with the
/// publishable key.
pub struct StripeGateway {
    http: reqwest::Client,
    api_url: Url,
    checkout_url: Url,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig, transport: &TransportConfig) -> Result<Self, CoreError> {
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.publishable_key.expose_secret()
        ))
        .map_err(|e| CoreError::Config {
            message: format!("invalid Stripe publishable key: {e}"),
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            checkout_url: config.checkout_url.clone(),
        })
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let url = self
            .api_url
            .join(path)
            .map_err(|e| GatewayError::new(format!("invalid Stripe URL: {e}")))?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| GatewayError::new(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::new(e.to_string()))?;

        if !status.is_success() {
            return Err(stripe_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::new(format!("unexpected Stripe response: {e}")))
    }
}

fn stripe_error(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(StripeErrorBody { error }) => GatewayError {
            message: error
                .message
                .unwrap_or_else(|| format!("Stripe request failed (HTTP {status})")),
            code: error.code,
            decline_code: error.decline_code,
        },
        Err(_) => GatewayError::new(format!("Stripe request failed (HTTP {status})")),
    }
}

/// The intent id is the client secret's prefix: `pi_123_secret_abc` → `pi_123`.
fn intent_id(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn confirm_card_payment(
        &self,
        client_secret: &SecretString,
    ) -> Result<PaymentIntentRef, GatewayError> {
        let secret = client_secret.expose_secret();
        let id = intent_id(secret)
            .ok_or_else(|| GatewayError::new("Malformed payment client secret"))?;

        self.post_form(
            &format!("v1/payment_intents/{id}/confirm"),
            &[("client_secret", secret)],
        )
        .await
    }

    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<PaymentMethod, GatewayError> {
        let exp_month = card.exp_month.to_string();
        let exp_year = card.exp_year.to_string();
        self.post_form(
            "v1/payment_methods",
            &[
                ("type", "card"),
                ("card[number]", card.number.expose_secret()),
                ("card[exp_month]", exp_month.as_str()),
                ("card[exp_year]", exp_year.as_str()),
                ("card[cvc]", card.cvc.expose_secret()),
            ],
        )
        .await
    }

    async fn redirect_to_checkout(&self, session_id: &str) -> Result<Url, GatewayError> {
        if session_id.is_empty() {
            return Err(GatewayError::new("Missing checkout session id"));
        }
        self.checkout_url
            .join(&format!("c/pay/{session_id}"))
            .map_err(|e| GatewayError::new(format!("invalid checkout URL: {e}")))
    }
}

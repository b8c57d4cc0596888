#![allow(clippy::unwrap_used)]
// Chained payment flows: backend intent → payment SDK → backend confirmation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::broadcast;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use soulseer_api::{ApiClient, TransportConfig};
use soulseer_core::models::{IntentStatus, PaymentIntentRef, PaymentMethod, PaymentMethodKind};
use soulseer_core::{
    Action, CardDetails, CoreError, GatewayError, Marketplace, PaymentGateway, StripeConfig,
    StripeGateway,
};

// ── Fake SDK ────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeGateway {
    confirm: Option<Result<IntentStatus, GatewayError>>,
    confirms: AtomicUsize,
    created: AtomicUsize,
}

impl FakeGateway {
    fn confirming(result: Result<IntentStatus, GatewayError>) -> Self {
        Self {
            confirm: Some(result),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn confirm_card_payment(
        &self,
        client_secret: &SecretString,
    ) -> Result<PaymentIntentRef, GatewayError> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        let id = client_secret
            .expose_secret()
            .split("_secret_")
            .next()
            .unwrap_or_default()
            .to_owned();
        let status = self
            .confirm
            .clone()
            .unwrap_or(Ok(IntentStatus::Succeeded))?;
        Ok(PaymentIntentRef {
            id,
            client_secret: None,
            status,
        })
    }

    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<PaymentMethod, GatewayError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let last4: String = card
            .number
            .expose_secret()
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        Ok(serde_json::from_value(json!({
            "id": "pm_new",
            "type": "card",
            "card": { "brand": "visa", "last4": last4 }
        }))
        .unwrap())
    }

    async fn redirect_to_checkout(&self, session_id: &str) -> Result<Url, GatewayError> {
        Ok(Url::parse(&format!("https://checkout.test/c/pay/{session_id}")).unwrap())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(gateway: Option<Arc<FakeGateway>>) -> (MockServer, Marketplace) {
    let server = MockServer::start().await;
    let api = ApiClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let gateway = gateway.map(|g| g as Arc<dyn PaymentGateway>);
    let market = Marketplace::from_parts(api, Some(SecretString::from("tok".to_owned())), gateway);
    (server, market)
}

fn kinds(log: &mut broadcast::Receiver<Action>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(action) = log.try_recv() {
        out.push(action.kind());
    }
    out
}

async fn mount_stripe_receipt(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/messages/payment"))
        .and(body_json(json!({ "messageId": "m1", "paymentMethod": "stripe" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "clientSecret": "pi_1_secret_abc",
                "payment": { "_id": "pay1", "status": "pending", "amount": 5.0 }
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_confirm(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/messages/payment/confirm"))
        .and(body_json(json!({ "paymentIntentId": "pi_1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "message": { "_id": "m1", "paid": true },
                "url": "https://files.test/m1"
            }
        })))
        .expect(expected)
        .mount(server)
        .await;
}

// ── Message payments ────────────────────────────────────────────────

#[tokio::test]
async fn test_succeeded_card_is_confirmed_before_success() {
    let gateway = Arc::new(FakeGateway::default());
    let (server, market) = setup(Some(Arc::clone(&gateway))).await;
    mount_stripe_receipt(&server).await;
    mount_confirm(&server, 1).await;

    let mut log = market.store().subscribe_actions();
    let receipt = market
        .process_message_payment("m1", PaymentMethodKind::Stripe)
        .await
        .unwrap();

    assert!(!receipt.is_completed());
    assert_eq!(gateway.confirms.load(Ordering::SeqCst), 1);
    assert_eq!(
        kinds(&mut log),
        vec![
            "PROCESS_PAYMENT_REQUEST",
            "CONFIRM_PAYMENT_REQUEST",
            "CONFIRM_PAYMENT_SUCCESS",
            "PROCESS_PAYMENT_SUCCESS",
        ]
    );
}

#[tokio::test]
async fn test_pending_card_skips_backend_confirmation() {
    let gateway = Arc::new(FakeGateway::confirming(Ok(IntentStatus::RequiresAction)));
    let (server, market) = setup(Some(Arc::clone(&gateway))).await;
    mount_stripe_receipt(&server).await;
    mount_confirm(&server, 0).await;

    let mut log = market.store().subscribe_actions();
    market
        .process_message_payment("m1", PaymentMethodKind::Stripe)
        .await
        .unwrap();

    assert_eq!(
        kinds(&mut log),
        vec![
            "PROCESS_PAYMENT_REQUEST",
            "PROCESS_PAYMENT_SUCCESS",
        ]
    );
    assert!(market.state().messages.payment_processing);
}

#[tokio::test]
async fn test_sdk_error_fails_without_confirmation() {
    let declined = GatewayError {
        message: "Your card was declined.".into(),
        code: Some("card_declined".into()),
        decline_code: Some("insufficient_funds".into()),
    };
    let gateway = Arc::new(FakeGateway::confirming(Err(declined)));
    let (server, market) = setup(Some(gateway)).await;
    mount_stripe_receipt(&server).await;
    mount_confirm(&server, 0).await;

    let mut log = market.store().subscribe_actions();
    let err = market
        .process_message_payment("m1", PaymentMethodKind::Stripe)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CoreError::PaymentDeclined {
            message: "Your card was declined.".into(),
            code: Some("insufficient_funds".into()),
        }
    );
    assert_eq!(
        kinds(&mut log),
        vec![
            "PROCESS_PAYMENT_REQUEST",
            "PROCESS_PAYMENT_FAILURE",
        ]
    );

    let state = market.state();
    assert!(!state.messages.payment_processing);
    assert_eq!(state.messages.error.as_deref(), Some("Your card was declined."));
    assert_eq!(
        market.errors().latest().as_deref(),
        Some("Your card was declined.")
    );
}

#[tokio::test]
async fn test_confirmation_failure_stops_the_chain() {
    let gateway = Arc::new(FakeGateway::default());
    let (server, market) = setup(Some(gateway)).await;
    mount_stripe_receipt(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/messages/payment/confirm"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Payment not found" })),
        )
        .mount(&server)
        .await;

    let mut log = market.store().subscribe_actions();
    let err = market
        .process_message_payment("m1", PaymentMethodKind::Stripe)
        .await
        .unwrap_err();

    assert_eq!(err.failure_message(), "Payment not found");
    let kinds = kinds(&mut log);
    assert!(!kinds.contains(&"PROCESS_PAYMENT_SUCCESS".to_owned()));
    assert_eq!(kinds.last().unwrap(), "CONFIRM_PAYMENT_FAILURE");
}

#[tokio::test]
async fn test_wallet_payment_never_touches_the_sdk() {
    let gateway = Arc::new(FakeGateway::default());
    let (server, market) = setup(Some(Arc::clone(&gateway))).await;
    Mock::given(method("POST"))
        .and(path("/api/messages/payment"))
        .and(body_json(json!({ "messageId": "m1", "paymentMethod": "wallet" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "payment": { "status": "completed" } }
        })))
        .mount(&server)
        .await;

    let receipt = market
        .process_message_payment("m1", PaymentMethodKind::Wallet)
        .await
        .unwrap();

    assert!(receipt.is_completed());
    assert_eq!(gateway.confirms.load(Ordering::SeqCst), 0);
    assert!(!market.state().messages.payment_processing);
}

#[tokio::test]
async fn test_card_payment_without_gateway_is_a_failure() {
    let (server, market) = setup(None).await;
    mount_stripe_receipt(&server).await;

    let err = market
        .process_message_payment("m1", PaymentMethodKind::Stripe)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Config { .. }));
    assert!(market.state().messages.error.is_some());
}

// ── Card confirmation ───────────────────────────────────────────────

#[tokio::test]
async fn test_unsucceeded_card_confirmation_reports_status() {
    let gateway = Arc::new(FakeGateway::confirming(Ok(IntentStatus::RequiresAction)));
    let (_server, market) = setup(Some(gateway)).await;

    let err = market
        .confirm_card_payment(&SecretString::from("pi_9_secret_x".to_owned()))
        .await
        .unwrap_err();

    assert_eq!(err.failure_message(), "Payment status: requires_action");
    let state = market.state();
    assert!(!state.payments.processing);
    assert_eq!(
        state.payments.error.as_deref(),
        Some("Payment status: requires_action")
    );
}

// ── Saved methods and checkout ──────────────────────────────────────

#[tokio::test]
async fn test_added_method_is_sdk_object_overlaid_with_backend() {
    let gateway = Arc::new(FakeGateway::default());
    let (server, market) = setup(Some(Arc::clone(&gateway))).await;
    Mock::given(method("POST"))
        .and(path("/api/stripe/payment-methods"))
        .and(body_json(json!({ "paymentMethodId": "pm_new" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "pm_new", "isDefault": true }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let card = CardDetails {
        number: SecretString::from("4242424242424242".to_owned()),
        exp_month: 12,
        exp_year: 2030,
        cvc: SecretString::from("123".to_owned()),
    };
    let method = market.add_payment_method(&card).await.unwrap();

    assert_eq!(gateway.created.load(Ordering::SeqCst), 1);
    assert_eq!(method.card.as_ref().unwrap().last4.as_deref(), Some("4242"));
    assert_eq!(method.extra.get("isDefault"), Some(&json!(true)));
    assert_eq!(market.state().payments.methods, vec![method]);
}

#[tokio::test]
async fn test_checkout_resolves_hosted_page() {
    let (server, market) = setup(Some(Arc::new(FakeGateway::default()))).await;
    Mock::given(method("POST"))
        .and(path("/api/stripe/checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "sessionId": "cs_1" }
        })))
        .mount(&server)
        .await;

    let redirect = market
        .checkout_product("p1", "https://app.test/ok", "https://app.test/cancel")
        .await
        .unwrap();

    assert_eq!(redirect.session.session_id, "cs_1");
    assert_eq!(redirect.url.as_str(), "https://checkout.test/c/pay/cs_1");
    assert!(!market.state().payments.processing);
}

// ── Stripe gateway ──────────────────────────────────────────────────

async fn stripe_for(server: &MockServer) -> StripeGateway {
    let mut config = StripeConfig::new(SecretString::from("pk_test_123".to_owned())).unwrap();
    config.api_url = Url::parse(&server.uri()).unwrap();
    StripeGateway::new(&config, &TransportConfig::default()).unwrap()
}

#[tokio::test]
async fn test_stripe_confirm_posts_client_secret() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents/pi_1/confirm"))
        .and(header("authorization", "Bearer pk_test_123"))
        .and(body_string_contains("client_secret=pi_1_secret_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pi_1",
            "client_secret": "pi_1_secret_abc",
            "status": "succeeded"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let intent = stripe_for(&server)
        .await
        .confirm_card_payment(&SecretString::from("pi_1_secret_abc".to_owned()))
        .await
        .unwrap();

    assert_eq!(intent.id, "pi_1");
    assert_eq!(intent.status, IntentStatus::Succeeded);
}

#[tokio::test]
async fn test_stripe_decline_carries_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_methods"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {
                "message": "Your card number is incorrect.",
                "code": "incorrect_number"
            }
        })))
        .mount(&server)
        .await;

    let card = CardDetails {
        number: SecretString::from("4000000000000002".to_owned()),
        exp_month: 1,
        exp_year: 2031,
        cvc: SecretString::from("999".to_owned()),
    };
    let err = stripe_for(&server)
        .await
        .create_payment_method(&card)
        .await
        .unwrap_err();

    assert_eq!(err.message, "Your card number is incorrect.");
    assert_eq!(err.code.as_deref(), Some("incorrect_number"));
    assert_eq!(err.decline_code, None);
}

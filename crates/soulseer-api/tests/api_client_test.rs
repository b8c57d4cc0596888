#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use soulseer_api::models::{Message, PaymentMethodKind, ProductPage};
use soulseer_api::{ApiClient, Error, messages, products};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

// ── Envelope tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_send_unwraps_data_and_sends_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/messages/conversation/c1"))
        .and(header("x-auth-token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "_id": "m1", "text": "hi" },
                { "_id": "m2", "text": "hello", "paid": true }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let messages: Vec<Message> = client
        .send(&messages::fetch_conversation("c1"), Some(&token("tok-1")))
        .await
        .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, "m1");
    assert_eq!(messages[1].paid, Some(true));
}

#[tokio::test]
async fn test_public_request_omits_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products/featured"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let _: Vec<serde_json::Value> = client
        .send(&products::featured(), Some(&token("tok-1")))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("x-auth-token"));
}

#[tokio::test]
async fn test_send_body_keeps_pagination() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("type", "reading"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "_id": "p1", "title": "Love reading" }],
            "pagination": { "page": 1, "limit": 12, "total": 30, "pages": 3 }
        })))
        .mount(&server)
        .await;

    let page: ProductPage = client
        .send_body(&products::list([("type", "reading"), ("search", "")]), None)
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.pagination.unwrap().pages, Some(3));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/messages/payment"))
        .and(body_json(json!({ "messageId": "m1", "paymentMethod": "wallet" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "payment": { "status": "completed" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt: soulseer_api::models::PaymentReceipt = client
        .send(
            &messages::process_payment("m1", PaymentMethodKind::Wallet),
            Some(&token("t")),
        )
        .await
        .unwrap();

    assert!(receipt.is_completed());
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token is not valid" })),
        )
        .mount(&server)
        .await;

    let result: Result<Vec<Message>, Error> = client
        .send(&messages::fetch_conversation("c1"), Some(&token("stale")))
        .await;

    match result {
        Err(ref err @ Error::Unauthorized { ref message }) => {
            assert!(err.is_auth_expired());
            assert_eq!(message.as_deref(), Some("Token is not valid"));
        }
        other => panic!("expected Unauthorized error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_backend_message_is_extracted() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/products/p1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })),
        )
        .mount(&server)
        .await;

    let result = client
        .send_empty(&products::delete("p1"), Some(&token("t")))
        .await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("Product not found"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_has_no_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client
        .send::<Vec<Message>>(&messages::fetch_conversation("c1"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.backend_message(), None);
}

#[tokio::test]
async fn test_missing_data_field_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let err = client
        .send::<Vec<Message>>(&messages::fetch_conversation("c1"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

// ── Auth tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "seer@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "fresh-token" }
        })))
        .mount(&server)
        .await;

    let issued = client
        .login("seer@example.com", &token("pw"))
        .await
        .unwrap();

    assert_eq!(issued.expose_secret(), "fresh-token");
}

#[tokio::test]
async fn test_refresh_accepts_bare_token_shape() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("x-auth-token", "stale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "renewed" })))
        .mount(&server)
        .await;

    let renewed = client.refresh_token(Some(&token("stale"))).await.unwrap();
    assert_eq!(renewed.expose_secret(), "renewed");
}

#[tokio::test]
async fn test_refresh_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.refresh_token(Some(&token("stale"))).await.unwrap_err();
    assert!(err.is_auth_expired());
}

// Backend Stripe endpoints
//
// Wallet deposits, reader Connect accounts and payouts, product checkout,
// and saved payment methods. These proxy the backend's Stripe integration;
// the client-side SDK calls live in `soulseer-core`'s payment gateway.

use serde_json::json;

use crate::request::ApiRequest;

/// Optional-id route helper: `{base}` or `{base}/{id}`.
fn scoped(base: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{base}/{id}"),
        None => base.to_owned(),
    }
}

/// Create a payment intent for a wallet deposit.
///
/// `POST /api/stripe/wallet/deposit` with `{"amount": ...}`
pub fn wallet_deposit(amount: f64) -> ApiRequest {
    ApiRequest::post("stripe/wallet/deposit").with_body(json!({ "amount": amount }))
}

/// Create the reader's Connect account and get an onboarding link.
///
/// `POST /api/stripe/reader/account`
pub fn create_reader_account() -> ApiRequest {
    ApiRequest::post("stripe/reader/account").with_body(json!({}))
}

/// Reader Connect account details, for the caller or another user (admin).
///
/// `GET /api/stripe/reader/account[/{user_id}]`
pub fn reader_account(user_id: Option<&str>) -> ApiRequest {
    ApiRequest::get(scoped("stripe/reader/account", user_id))
}

/// Transfer earnings to a reader.
///
/// `POST /api/stripe/reader/payout[/{reader_id}]` with `{"amount": ...}`
pub fn reader_payout(amount: f64, reader_id: Option<&str>) -> ApiRequest {
    ApiRequest::post(scoped("stripe/reader/payout", reader_id)).with_body(json!({ "amount": amount }))
}

/// Express-dashboard login link.
///
/// `GET /api/stripe/reader/login[/{user_id}]`
pub fn login_link(user_id: Option<&str>) -> ApiRequest {
    ApiRequest::get(scoped("stripe/reader/login", user_id))
}

/// Create a hosted checkout session for a product.
///
/// `POST /api/stripe/checkout` with `{"productId", "successUrl", "cancelUrl"}`
pub fn checkout(product_id: &str, success_url: &str, cancel_url: &str) -> ApiRequest {
    ApiRequest::post("stripe/checkout").with_body(json!({
        "productId": product_id,
        "successUrl": success_url,
        "cancelUrl": cancel_url,
    }))
}

/// Attach an SDK-created payment method to the customer.
///
/// `POST /api/stripe/payment-methods` with `{"paymentMethodId": ...}`
pub fn attach_payment_method(payment_method_id: &str) -> ApiRequest {
    ApiRequest::post("stripe/payment-methods").with_body(json!({
        "paymentMethodId": payment_method_id,
    }))
}

/// `GET /api/stripe/payment-methods`
pub fn payment_methods() -> ApiRequest {
    ApiRequest::get("stripe/payment-methods")
}

/// `DELETE /api/stripe/payment-methods/{payment_method_id}`
pub fn delete_payment_method(payment_method_id: &str) -> ApiRequest {
    ApiRequest::delete(format!("stripe/payment-methods/{payment_method_id}"))
}

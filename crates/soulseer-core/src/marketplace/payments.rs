// Payment action creators: wallet deposits, card confirmation, reader
// Connect accounts and payouts, product checkout, saved payment methods.

use secrecy::SecretString;
use serde_json::Value;
use soulseer_api::models::{
    CheckoutSession, ConnectAccount, DepositIntent, LoginLink, PaymentMethod, Payout,
};
use soulseer_api::stripe;

use super::Marketplace;
use crate::action::PaymentAction;
use crate::dispatch::{Envelope, Operation};
use crate::error::CoreError;
use crate::payment::{CardConfirmation, CardDetails, CheckoutRedirect};
use crate::reducer::shallow_merge;

const WALLET_DEPOSIT: Operation<DepositIntent> = Operation {
    wrap: |phase| PaymentAction::WalletDeposit(phase).into(),
    fallback: "Error creating wallet deposit",
};

const CONFIRM_CARD: Operation<CardConfirmation> = Operation {
    wrap: |phase| PaymentAction::ConfirmCard(phase).into(),
    fallback: "Error processing payment",
};

const CREATE_READER_ACCOUNT: Operation<ConnectAccount> = Operation {
    wrap: |phase| PaymentAction::CreateReaderAccount(phase).into(),
    fallback: "Error creating reader account",
};

const FETCH_READER_ACCOUNT: Operation<ConnectAccount> = Operation {
    wrap: |phase| PaymentAction::FetchReaderAccount(phase).into(),
    fallback: "Error getting reader account",
};

const READER_PAYOUT: Operation<Payout> = Operation {
    wrap: |phase| PaymentAction::ReaderPayout(phase).into(),
    fallback: "Error processing reader payout",
};

const LOGIN_LINK: Operation<LoginLink> = Operation {
    wrap: |phase| PaymentAction::LoginLink(phase).into(),
    fallback: "Error getting login link",
};

const CHECKOUT: Operation<CheckoutRedirect> = Operation {
    wrap: |phase| PaymentAction::Checkout(phase).into(),
    fallback: "Error creating checkout session",
};

const FETCH_METHODS: Operation<Vec<PaymentMethod>> = Operation {
    wrap: |phase| PaymentAction::FetchMethods(phase).into(),
    fallback: "Error getting payment methods",
};

const ADD_METHOD: Operation<PaymentMethod> = Operation {
    wrap: |phase| PaymentAction::AddMethod(phase).into(),
    fallback: "Error creating payment method",
};

const REMOVE_METHOD: Operation<String> = Operation {
    wrap: |phase| PaymentAction::RemoveMethod(phase).into(),
    fallback: "Error deleting payment method",
};

impl Marketplace {
    // ── Wallet ───────────────────────────────────────────────────────

    /// Create a payment intent for topping up the wallet. The returned
    /// client secret is confirmed with [`confirm_card_payment`](Self::confirm_card_payment).
    pub async fn create_wallet_deposit(&self, amount: f64) -> Result<DepositIntent, CoreError> {
        self.dispatcher()
            .run(&WALLET_DEPOSIT, &stripe::wallet_deposit(amount), Envelope::Data)
            .await
    }

    /// Confirm a payment intent client-side. Only a `succeeded` intent
    /// counts as success; other statuses fail with `Payment status: <status>`.
    pub async fn confirm_card_payment(
        &self,
        client_secret: &SecretString,
    ) -> Result<CardConfirmation, CoreError> {
        let d = self.dispatcher();
        d.announce(&CONFIRM_CARD);

        let gateway = self.gateway(&CONFIRM_CARD)?;
        let intent = d
            .execute_gateway(&CONFIRM_CARD, gateway.confirm_card_payment(client_secret))
            .await?;
        let confirmation = CardConfirmation::from_intent(intent)
            .map_err(|e| d.fail(&CONFIRM_CARD, e.into()))?;

        d.complete(&CONFIRM_CARD, confirmation.clone());
        Ok(confirmation)
    }

    // ── Reader Connect accounts ──────────────────────────────────────

    /// Create the caller's Connect account; the result carries the
    /// onboarding link.
    pub async fn create_reader_account(&self) -> Result<ConnectAccount, CoreError> {
        self.dispatcher()
            .run(
                &CREATE_READER_ACCOUNT,
                &stripe::create_reader_account(),
                Envelope::Data,
            )
            .await
    }

    /// Connect account details for the caller, or for `user_id` (admin).
    pub async fn reader_account(&self, user_id: Option<&str>) -> Result<ConnectAccount, CoreError> {
        self.dispatcher()
            .run(
                &FETCH_READER_ACCOUNT,
                &stripe::reader_account(user_id),
                Envelope::Data,
            )
            .await
    }

    /// Pay out earnings to the caller, or to `reader_id` (admin).
    pub async fn reader_payout(
        &self,
        amount: f64,
        reader_id: Option<&str>,
    ) -> Result<Payout, CoreError> {
        self.dispatcher()
            .run(
                &READER_PAYOUT,
                &stripe::reader_payout(amount, reader_id),
                Envelope::Data,
            )
            .await
    }

    /// Express-dashboard login link.
    pub async fn reader_login_link(&self, user_id: Option<&str>) -> Result<LoginLink, CoreError> {
        self.dispatcher()
            .run(&LOGIN_LINK, &stripe::login_link(user_id), Envelope::Data)
            .await
    }

    // ── Checkout ─────────────────────────────────────────────────────

    /// Create a checkout session for a product and resolve the hosted
    /// checkout page to send the buyer to.
    pub async fn checkout_product(
        &self,
        product_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutRedirect, CoreError> {
        let d = self.dispatcher();
        let session: CheckoutSession = d
            .execute(
                &CHECKOUT,
                &stripe::checkout(product_id, success_url, cancel_url),
                Envelope::Data,
            )
            .await?;

        let gateway = self.gateway(&CHECKOUT)?;
        let url = d
            .execute_gateway(&CHECKOUT, gateway.redirect_to_checkout(&session.session_id))
            .await?;

        let redirect = CheckoutRedirect { session, url };
        d.complete(&CHECKOUT, redirect.clone());
        Ok(redirect)
    }

    // ── Saved payment methods ────────────────────────────────────────

    /// Tokenize a card with the SDK and attach it to the customer. The
    /// result is the SDK's method overlaid with the backend's response.
    pub async fn add_payment_method(&self, card: &CardDetails) -> Result<PaymentMethod, CoreError> {
        let d = self.dispatcher();
        d.announce(&ADD_METHOD);

        let gateway = self.gateway(&ADD_METHOD)?;
        let created = d
            .execute_gateway(&ADD_METHOD, gateway.create_payment_method(card))
            .await?;

        let attached: Value = d
            .call(
                &ADD_METHOD,
                &stripe::attach_payment_method(&created.id),
                Envelope::Data,
            )
            .await?;

        let method = overlay(created, attached).map_err(|e| {
            d.fail(
                &ADD_METHOD,
                CoreError::Unknown {
                    message: format!("{}: {e}", ADD_METHOD.fallback),
                },
            )
        })?;

        d.complete(&ADD_METHOD, method.clone());
        Ok(method)
    }

    pub async fn fetch_payment_methods(&self) -> Result<Vec<PaymentMethod>, CoreError> {
        self.dispatcher()
            .run(&FETCH_METHODS, &stripe::payment_methods(), Envelope::Data)
            .await
    }

    pub async fn remove_payment_method(&self, payment_method_id: &str) -> Result<(), CoreError> {
        let d = self.dispatcher();
        d.execute_empty(
            &REMOVE_METHOD,
            &stripe::delete_payment_method(payment_method_id),
        )
        .await?;
        d.complete(&REMOVE_METHOD, payment_method_id.to_owned());
        Ok(())
    }
}

/// Shallow-merge a JSON object over a payment method.
fn overlay(method: PaymentMethod, patch: Value) -> Result<PaymentMethod, serde_json::Error> {
    match patch {
        Value::Object(fields) => shallow_merge(&method, &fields),
        _ => Ok(method),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn overlay_prefers_backend_fields() {
        let method: PaymentMethod = serde_json::from_value(json!({
            "id": "pm_1",
            "type": "card",
            "card": { "brand": "visa", "last4": "4242" }
        }))
        .unwrap();

        let merged = overlay(method, json!({ "id": "pm_1", "isDefault": true })).unwrap();

        assert_eq!(merged.id, "pm_1");
        assert_eq!(merged.card.unwrap().last4.as_deref(), Some("4242"));
        assert_eq!(merged.extra.get("isDefault"), Some(&json!(true)));
    }

    #[test]
    fn overlay_ignores_non_objects() {
        let method = PaymentMethod {
            id: "pm_2".into(),
            ..PaymentMethod::default()
        };
        assert_eq!(overlay(method.clone(), Value::Null).unwrap(), method);
    }
}

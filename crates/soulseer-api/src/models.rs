// Wire models for the SoulSeer backend.
//
// Documents are MongoDB-backed: identity is the `_id` string and field names
// are camelCase. Unknown fields are kept in `extra` so a shallow merge of a
// partial update never drops data the client does not model.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize opaque secrets (client secrets, tokens) straight into
/// `SecretString` so they never sit in a plain `String` field.
pub(crate) mod secret {
    use super::{Deserialize, Deserializer, SecretString};

    pub(crate) fn required<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
        String::deserialize(d).map(SecretString::from)
    }

    pub(crate) fn optional<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
    }
}

// ── Messages ─────────────────────────────────────────────────────────

/// A message in a paid or free conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub recipient: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Body of `PUT /api/messages/{id}/settings` (paid/free toggle).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// How a paid message is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodKind {
    /// Card payment confirmed client-side through Stripe.
    Stripe,
    /// Debit from the user's prepaid wallet balance.
    Wallet,
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stripe => f.write_str("stripe"),
            Self::Wallet => f.write_str("wallet"),
        }
    }
}

/// Result of `POST /api/messages/payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    /// Present when the payment must be confirmed client-side.
    #[serde(default, deserialize_with = "secret::optional", skip_serializing)]
    pub client_secret: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Backend payment document embedded in a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl PaymentReceipt {
    /// `true` once the backend reports the payment as settled.
    pub fn is_completed(&self) -> bool {
        self.payment
            .as_ref()
            .and_then(|p| p.status.as_deref())
            .is_some_and(|s| s == "completed")
    }
}

/// A message document returned by an update, kept as raw JSON.
///
/// Unlike [`Message`] it remembers keys the backend set to `null`, so merging
/// it into state clears those fields instead of keeping the old values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessagePatch(pub Map<String, Value>);

impl MessagePatch {
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Decode the patch as a full message.
    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

/// Result of `POST /api/messages/payment/confirm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub message: MessagePatch,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentConfirmation {
    /// The paid message, decoded.
    pub fn paid_message(&self) -> Result<Message, serde_json::Error> {
        self.message.to_message()
    }
}

// ── Products ─────────────────────────────────────────────────────────

/// A marketplace product (digital reading, course, physical item, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Create/update payload for a product. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pagination block returned alongside product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
}

/// Whole-body response of the listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub data: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// A product category with its catalogue count.
///
/// The categories endpoint returns either bare names or aggregation rows
/// (`{ "_id": "tarot", "count": 12 }`); both decode to this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryWire")]
pub struct Category {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryWire {
    Name(String),
    Row {
        #[serde(alias = "_id")]
        name: String,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl From<CategoryWire> for Category {
    fn from(wire: CategoryWire) -> Self {
        match wire {
            CategoryWire::Name(name) => Self { name, count: None },
            CategoryWire::Row { name, count } => Self { name, count },
        }
    }
}

// ── Stripe / payments ────────────────────────────────────────────────

/// Lifecycle state of a payment intent as reported by the payment SDK.
///
/// Statuses the client does not branch on are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentStatus {
    RequiresAction,
    Succeeded,
    Failed,
    Other(String),
}

impl IntentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RequiresAction => "requires_action",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for IntentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "requires_action" => Self::RequiresAction,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<IntentStatus> for String {
    fn from(status: IntentStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a payment intent, passed through to the payment SDK.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRef {
    pub id: String,
    #[serde(
        default,
        alias = "client_secret",
        deserialize_with = "secret::optional",
        skip_serializing
    )]
    pub client_secret: Option<SecretString>,
    pub status: IntentStatus,
}

/// Result of `POST /api/stripe/wallet/deposit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositIntent {
    #[serde(deserialize_with = "secret::required", skip_serializing)]
    pub client_secret: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reader Connect account, with the onboarding link when one was issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAccount {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(
        default,
        alias = "onboardingLink",
        alias = "url",
        skip_serializing_if = "Option::is_none"
    )]
    pub onboarding_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a reader payout (Connect transfer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hosted checkout session for a product purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    #[serde(alias = "id")]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Express-dashboard login link for a Connect account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginLink {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Card summary as reported by Stripe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub exp_month: Option<u32>,
    #[serde(default)]
    pub exp_year: Option<u32>,
}

/// A saved payment method (Stripe object shape, snake_case).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub method_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_keeps_unknown_fields() {
        let msg: Message = serde_json::from_value(json!({
            "_id": "m1",
            "text": "hi",
            "sender": "u1",
            "createdAt": "2024-06-15T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(msg.id, "m1");
        assert_eq!(msg.text.as_deref(), Some("hi"));
        assert_eq!(msg.extra.get("sender"), Some(&json!("u1")));
        assert!(msg.created_at.is_some());

        let back = serde_json::to_value(&msg).unwrap();
        assert_eq!(back["sender"], json!("u1"));
        assert_eq!(back["_id"], json!("m1"));
    }

    #[test]
    fn message_patch_keeps_explicit_nulls() {
        let patch: MessagePatch =
            serde_json::from_value(json!({ "_id": "m1", "paid": false, "price": null })).unwrap();

        assert_eq!(patch.id(), Some("m1"));
        assert_eq!(patch.fields().get("price"), Some(&Value::Null));

        let message = patch.to_message().unwrap();
        assert_eq!(message.paid, Some(false));
        assert_eq!(message.price, None);
    }

    #[test]
    fn intent_status_keeps_unknown_values() {
        let status: IntentStatus = serde_json::from_value(json!("processing")).unwrap();
        assert_eq!(status, IntentStatus::Other("processing".into()));
        assert_eq!(status.to_string(), "processing");

        let status: IntentStatus = serde_json::from_value(json!("succeeded")).unwrap();
        assert_eq!(status, IntentStatus::Succeeded);
    }

    #[test]
    fn receipt_completion_reads_payment_status() {
        let receipt: PaymentReceipt = serde_json::from_value(json!({
            "payment": { "_id": "p1", "status": "completed" }
        }))
        .unwrap();
        assert!(receipt.is_completed());
        assert!(receipt.client_secret.is_none());

        let pending: PaymentReceipt = serde_json::from_value(json!({
            "clientSecret": "pi_1_secret_2",
            "payment": { "status": "pending" }
        }))
        .unwrap();
        assert!(!pending.is_completed());
        assert!(pending.client_secret.is_some());
    }

    #[test]
    fn product_type_field_is_renamed() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Tarot deck",
            "type": "physical",
            "categories": ["tarot"]
        }))
        .unwrap();
        assert_eq!(product.product_type.as_deref(), Some("physical"));
        assert!(!product.featured);
    }

    #[test]
    fn categories_accept_names_and_rows() {
        let cats: Vec<Category> = serde_json::from_value(json!([
            "tarot",
            { "_id": "astrology", "count": 4 }
        ]))
        .unwrap();
        assert_eq!(cats[0].name, "tarot");
        assert_eq!(cats[0].count, None);
        assert_eq!(cats[1].name, "astrology");
        assert_eq!(cats[1].count, Some(4));
    }

    #[test]
    fn intent_ref_reads_stripe_snake_case() {
        let intent: PaymentIntentRef = serde_json::from_value(json!({
            "id": "pi_1",
            "client_secret": "pi_1_secret_x",
            "status": "requires_action"
        }))
        .unwrap();
        assert_eq!(intent.status, IntentStatus::RequiresAction);
        assert!(intent.client_secret.is_some());
    }
}

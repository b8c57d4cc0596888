// Message endpoints
//
// Conversation reads, sends, and the paid-message payment flow. All
// message routes require the session token.

use serde_json::json;

use crate::error::Error;
use crate::models::{MessageSettings, NewMessage, PaymentMethodKind};
use crate::request::ApiRequest;

/// List the messages of a conversation.
///
/// `GET /api/messages/conversation/{conversation_id}`
pub fn fetch_conversation(conversation_id: &str) -> ApiRequest {
    ApiRequest::get(format!("messages/conversation/{conversation_id}"))
}

/// Send a message.
///
/// `POST /api/messages`
pub fn send(message: &NewMessage) -> Result<ApiRequest, Error> {
    ApiRequest::post("messages").json(message)
}

/// Start payment for a paid message.
///
/// `POST /api/messages/payment` with `{"messageId": ..., "paymentMethod": ...}`
pub fn process_payment(message_id: &str, method: PaymentMethodKind) -> ApiRequest {
    ApiRequest::post("messages/payment").with_body(json!({
        "messageId": message_id,
        "paymentMethod": method,
    }))
}

/// Tell the backend a client-side card confirmation succeeded.
///
/// `POST /api/messages/payment/confirm` with `{"paymentIntentId": ...}`
pub fn confirm_payment(payment_intent_id: &str) -> ApiRequest {
    ApiRequest::post("messages/payment/confirm").with_body(json!({
        "paymentIntentId": payment_intent_id,
    }))
}

/// Toggle a message between paid and free.
///
/// `PUT /api/messages/{message_id}/settings`
pub fn update_settings(message_id: &str, settings: &MessageSettings) -> Result<ApiRequest, Error> {
    ApiRequest::put(format!("messages/{message_id}/settings")).json(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn payment_body_uses_wire_names() {
        let req = process_payment("m1", PaymentMethodKind::Stripe);
        assert_eq!(req.method, Method::Post);
        assert_eq!(
            req.body,
            Some(json!({ "messageId": "m1", "paymentMethod": "stripe" }))
        );
        assert!(req.auth);
    }

    #[test]
    fn settings_omit_unset_fields() {
        let req = update_settings(
            "m1",
            &MessageSettings {
                paid: Some(true),
                price: None,
            },
        )
        .unwrap();
        assert_eq!(req.path, "messages/m1/settings");
        assert_eq!(req.body, Some(json!({ "paid": true })));
    }
}

// Message action creators.

use soulseer_api::messages;
use soulseer_api::models::{
    IntentStatus, Message, MessagePatch, MessageSettings, NewMessage, PaymentConfirmation,
    PaymentMethodKind, PaymentReceipt,
};
use tracing::{debug, info};

use super::Marketplace;
use crate::action::MessageAction;
use crate::dispatch::{Envelope, Operation};
use crate::error::CoreError;

const FETCH_MESSAGES: Operation<Vec<Message>> = Operation {
    wrap: |phase| MessageAction::Fetch(phase).into(),
    fallback: "Error fetching messages",
};

const SEND_MESSAGE: Operation<Message> = Operation {
    wrap: |phase| MessageAction::Send(phase).into(),
    fallback: "Error sending message",
};

const PROCESS_PAYMENT: Operation<PaymentReceipt> = Operation {
    wrap: |phase| MessageAction::ProcessPayment(phase).into(),
    fallback: "Error processing payment",
};

const CONFIRM_PAYMENT: Operation<PaymentConfirmation> = Operation {
    wrap: |phase| MessageAction::ConfirmPayment(phase).into(),
    fallback: "Error confirming payment",
};

const UPDATE_SETTINGS: Operation<MessagePatch> = Operation {
    wrap: |phase| MessageAction::UpdateSettings(phase).into(),
    fallback: "Error updating message settings",
};

impl Marketplace {
    /// Load a conversation, replacing the messages in state.
    pub async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<Message>, CoreError> {
        self.dispatcher()
            .run(
                &FETCH_MESSAGES,
                &messages::fetch_conversation(conversation_id),
                Envelope::Data,
            )
            .await
    }

    /// Send a message and append it to the conversation.
    pub async fn send_message(&self, message: &NewMessage) -> Result<Message, CoreError> {
        let request = messages::send(message)
            .map_err(|e| self.dispatcher().fail(&SEND_MESSAGE, CoreError::from(e)))?;
        self.dispatcher()
            .run(&SEND_MESSAGE, &request, Envelope::Data)
            .await
    }

    /// Pay for a message.
    ///
    /// Wallet payments settle on the backend. Stripe payments return a
    /// client secret that is confirmed with the payment SDK; only a
    /// `succeeded` intent is confirmed with the backend. SUCCESS is
    /// dispatched once the whole chain is done.
    pub async fn process_message_payment(
        &self,
        message_id: &str,
        method: PaymentMethodKind,
    ) -> Result<PaymentReceipt, CoreError> {
        let d = self.dispatcher();
        let receipt: PaymentReceipt = d
            .execute(
                &PROCESS_PAYMENT,
                &messages::process_payment(message_id, method),
                Envelope::Data,
            )
            .await?;

        if method == PaymentMethodKind::Stripe {
            if let Some(ref client_secret) = receipt.client_secret {
                let gateway = self.gateway(&PROCESS_PAYMENT)?;
                let intent = d
                    .execute_gateway(&PROCESS_PAYMENT, gateway.confirm_card_payment(client_secret))
                    .await?;

                if intent.status == IntentStatus::Succeeded {
                    self.confirm_payment(&intent.id).await?;
                } else {
                    debug!(
                        message_id,
                        status = %intent.status,
                        "card confirmation pending; skipping backend confirmation"
                    );
                }
            }
        }

        info!(message_id, %method, completed = receipt.is_completed(), "message payment processed");
        d.complete(&PROCESS_PAYMENT, receipt.clone());
        Ok(receipt)
    }

    /// Tell the backend a card payment succeeded; the paid message is
    /// merged into state.
    pub async fn confirm_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentConfirmation, CoreError> {
        self.dispatcher()
            .run(
                &CONFIRM_PAYMENT,
                &messages::confirm_payment(payment_intent_id),
                Envelope::Data,
            )
            .await
    }

    /// Toggle a message between paid and free.
    pub async fn update_message_settings(
        &self,
        message_id: &str,
        settings: &MessageSettings,
    ) -> Result<Message, CoreError> {
        let d = self.dispatcher();
        let request = messages::update_settings(message_id, settings)
            .map_err(|e| d.fail(&UPDATE_SETTINGS, CoreError::from(e)))?;

        // Kept as raw JSON so cleared fields (`"price": null`) reach state.
        let patch: MessagePatch = d
            .execute(&UPDATE_SETTINGS, &request, Envelope::Data)
            .await?;
        let message = patch.to_message().map_err(|e| {
            d.fail(
                &UPDATE_SETTINGS,
                CoreError::Unknown {
                    message: format!("{}: {e}", UPDATE_SETTINGS.fallback),
                },
            )
        })?;

        d.complete(&UPDATE_SETTINGS, patch);
        Ok(message)
    }
}

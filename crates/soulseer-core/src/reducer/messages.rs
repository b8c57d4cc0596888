// Messages slice: conversation contents plus the paid-message payment flag.

use serde::Serialize;
use soulseer_api::models::{Message, MessagePatch};

use super::merge_in_place;
use crate::action::{MessageAction, Phase};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagesState {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub payment_processing: bool,
    pub error: Option<String>,
}

pub fn reduce(mut state: MessagesState, action: MessageAction) -> MessagesState {
    match action {
        MessageAction::Fetch(phase) => match phase {
            Phase::Request => start_loading(state),
            Phase::Success(messages) => {
                state.messages = messages;
                finish_loading(state)
            }
            Phase::Failure(error) => fail_loading(state, error),
        },

        MessageAction::Send(phase) => match phase {
            Phase::Request => start_loading(state),
            Phase::Success(message) => {
                state.messages.push(message);
                finish_loading(state)
            }
            Phase::Failure(error) => fail_loading(state, error),
        },

        MessageAction::UpdateSettings(phase) => match phase {
            Phase::Request => start_loading(state),
            Phase::Success(patch) => {
                apply_patch(&mut state.messages, &patch);
                finish_loading(state)
            }
            Phase::Failure(error) => fail_loading(state, error),
        },

        // Stripe payments stay "processing" until the card is confirmed.
        MessageAction::ProcessPayment(phase) => match phase {
            Phase::Request => start_payment(state),
            Phase::Success(receipt) => MessagesState {
                payment_processing: !receipt.is_completed(),
                error: None,
                ..state
            },
            Phase::Failure(error) => fail_payment(state, error),
        },

        MessageAction::ConfirmPayment(phase) => match phase {
            Phase::Request => start_payment(state),
            Phase::Success(confirmation) => {
                apply_patch(&mut state.messages, &confirmation.message);
                MessagesState {
                    payment_processing: false,
                    error: None,
                    ..state
                }
            }
            Phase::Failure(error) => fail_payment(state, error),
        },
    }
}

fn apply_patch(messages: &mut [Message], patch: &MessagePatch) {
    if let Some(id) = patch.id() {
        merge_in_place(messages, id, patch.fields());
    }
}

fn start_loading(state: MessagesState) -> MessagesState {
    MessagesState {
        loading: true,
        error: None,
        ..state
    }
}

fn finish_loading(state: MessagesState) -> MessagesState {
    MessagesState {
        loading: false,
        error: None,
        ..state
    }
}

fn fail_loading(state: MessagesState, error: String) -> MessagesState {
    MessagesState {
        loading: false,
        error: Some(error),
        ..state
    }
}

fn start_payment(state: MessagesState) -> MessagesState {
    MessagesState {
        payment_processing: true,
        error: None,
        ..state
    }
}

fn fail_payment(state: MessagesState, error: String) -> MessagesState {
    MessagesState {
        payment_processing: false,
        error: Some(error),
        ..state
    }
}

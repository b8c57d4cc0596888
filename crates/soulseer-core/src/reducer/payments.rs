// Payments slice: saved payment methods and the in-flight flag for Stripe
// and payout flows.

use serde::Serialize;
use soulseer_api::models::PaymentMethod;

use super::remove_by_id;
use crate::action::{PaymentAction, Phase};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentsState {
    pub methods: Vec<PaymentMethod>,
    pub processing: bool,
    pub error: Option<String>,
}

pub fn reduce(mut state: PaymentsState, action: PaymentAction) -> PaymentsState {
    let outcome = match action {
        PaymentAction::FetchMethods(phase) => phase.map(|methods| state.methods = methods),
        PaymentAction::AddMethod(phase) => phase.map(|method| state.methods.push(method)),
        PaymentAction::RemoveMethod(phase) => phase.map(|id| {
            remove_by_id(&mut state.methods, &id);
        }),
        PaymentAction::WalletDeposit(phase) => phase.map(drop),
        PaymentAction::ConfirmCard(phase) => phase.map(drop),
        PaymentAction::CreateReaderAccount(phase) | PaymentAction::FetchReaderAccount(phase) => {
            phase.map(drop)
        }
        PaymentAction::ReaderPayout(phase) => phase.map(drop),
        PaymentAction::LoginLink(phase) => phase.map(drop),
        PaymentAction::Checkout(phase) => phase.map(drop),
    };

    match outcome {
        Phase::Request => PaymentsState {
            processing: true,
            error: None,
            ..state
        },
        Phase::Success(()) => PaymentsState {
            processing: false,
            error: None,
            ..state
        },
        Phase::Failure(error) => PaymentsState {
            processing: false,
            error: Some(error),
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn method(id: &str) -> PaymentMethod {
        PaymentMethod {
            id: id.into(),
            ..PaymentMethod::default()
        }
    }

    #[test]
    fn method_list_lifecycle() {
        let state = reduce(
            PaymentsState::default(),
            PaymentAction::FetchMethods(Phase::Request),
        );
        assert!(state.processing);

        let state = reduce(
            state,
            PaymentAction::FetchMethods(Phase::Success(vec![method("pm_1"), method("pm_2")])),
        );
        let state = reduce(state, PaymentAction::AddMethod(Phase::Success(method("pm_3"))));
        let state = reduce(
            state,
            PaymentAction::RemoveMethod(Phase::Success("pm_1".into())),
        );

        assert_eq!(
            state,
            PaymentsState {
                methods: vec![method("pm_2"), method("pm_3")],
                processing: false,
                error: None,
            }
        );
    }

    #[test]
    fn failure_keeps_methods() {
        let previous = PaymentsState {
            methods: vec![method("pm_1")],
            ..PaymentsState::default()
        };
        let state = reduce(
            previous,
            PaymentAction::ReaderPayout(Phase::Failure("Insufficient balance".into())),
        );
        assert_eq!(state.methods, vec![method("pm_1")]);
        assert_eq!(state.error.as_deref(), Some("Insufficient balance"));
        assert!(!state.processing);
    }
}

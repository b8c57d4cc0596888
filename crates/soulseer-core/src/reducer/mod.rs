// ── Reducers ──
//
// Pure `(state, action) -> state` functions, one per slice. They take the
// old state by value and return the next one; nothing here performs I/O.
// The list helpers are shared by every slice through `Identified`.

pub mod messages;
pub mod payments;
pub mod products;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use soulseer_api::models::{Message, PaymentMethod, Product};
use tracing::warn;

use crate::action::Action;
use crate::store::AppState;

pub use messages::MessagesState;
pub use payments::PaymentsState;
pub use products::ProductsState;

/// Route an action to the slice that owns it.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::Messages(a) => AppState {
            messages: messages::reduce(state.messages, a),
            ..state
        },
        Action::Products(a) => AppState {
            products: products::reduce(state.products, a),
            ..state
        },
        Action::Payments(a) => AppState {
            payments: payments::reduce(state.payments, a),
            ..state
        },
    }
}

// ── Identity and merging ─────────────────────────────────────────────

/// Items kept in a slice list, keyed by backend id.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Message {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for PaymentMethod {
    fn id(&self) -> &str {
        &self.id
    }
}

// ── List helpers ─────────────────────────────────────────────────────

/// Replace the item with the same id, keeping its position.
/// Returns `false` when no item matched.
pub fn replace_in_place<T: Identified>(items: &mut [T], item: T) -> bool {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

/// Shallow merge at the document level: every key in `patch` wins, `null`
/// included, and keys the patch does not name survive.
pub fn shallow_merge<T>(item: &T, patch: &Map<String, Value>) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(item)?;
    if let Value::Object(ref mut fields) = merged {
        fields.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    serde_json::from_value(merged)
}

/// Shallow-merge `patch` into the item with id `id`, keeping its position.
/// Returns `false` when no item matched or the merged document no longer
/// decodes; the item is left as it was in both cases.
pub fn merge_in_place<T>(items: &mut [T], id: &str, patch: &Map<String, Value>) -> bool
where
    T: Identified + Serialize + DeserializeOwned,
{
    let Some(slot) = items.iter_mut().find(|existing| existing.id() == id) else {
        return false;
    };
    match shallow_merge(&*slot, patch) {
        Ok(merged) => {
            *slot = merged;
            true
        }
        Err(e) => {
            warn!(id, error = %e, "merged document does not decode; keeping the old one");
            false
        }
    }
}

/// Drop every item with the given id. Returns `true` if any was removed.
pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

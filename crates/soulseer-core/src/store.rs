// ── Reactive application store ──
//
// Holds the current `AppState` snapshot in a `watch` channel. Dispatch runs
// the root reducer inside `send_modify`, so reductions are serialized and
// every subscriber sees each new snapshot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

use crate::action::Action;
use crate::reducer::{self, MessagesState, PaymentsState, ProductsState};

const ACTION_CHANNEL_SIZE: usize = 256;

/// The whole client-side state: one field per resource slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub messages: MessagesState,
    pub products: ProductsState,
    pub payments: PaymentsState,
}

/// Snapshot store. Cheaply cloneable; clones share the same state.
#[derive(Clone)]
pub struct Store {
    state: watch::Sender<Arc<AppState>>,
    actions: broadcast::Sender<Action>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        let (state, _) = watch::channel(Arc::new(state));
        let (actions, _) = broadcast::channel(ACTION_CHANNEL_SIZE);
        Self { state, actions }
    }

    /// Reduce `action` into the current state and notify subscribers.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        trace!(kind = %action.kind(), "dispatch");

        let logged = (self.actions.receiver_count() > 0).then(|| action.clone());

        self.state.send_modify(|snapshot| {
            let slot = Arc::make_mut(snapshot);
            let previous = std::mem::take(slot);
            *slot = reducer::reduce(previous, action);
        });

        // Logged only once reduced, so listeners always observe the new state.
        if let Some(action) = logged {
            let _ = self.actions.send(action);
        }
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Arc<AppState> {
        self.state.borrow().clone()
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    /// Subscribe to the raw action log (every action dispatched from now on).
    pub fn subscribe_actions(&self) -> broadcast::Receiver<Action> {
        self.actions.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

// ── StateStream ──────────────────────────────────────────────────────

/// A subscription to store snapshots.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct StateStream {
    current: Arc<AppState>,
    receiver: watch::Receiver<Arc<AppState>>,
}

impl StateStream {
    fn new(receiver: watch::Receiver<Arc<AppState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Arc<AppState> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<AppState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<AppState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StateWatchStream {
    inner: WatchStream<Arc<AppState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<AppState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;
    use soulseer_api::models::Message;

    use super::*;
    use crate::action::{MessageAction, Phase};

    #[tokio::test]
    async fn dispatch_notifies_subscribers() {
        let store = Store::new();
        let mut stream = store.subscribe();
        assert!(!stream.current().messages.loading);

        store.dispatch(MessageAction::Fetch(Phase::Request));

        let snap = stream.changed().await.unwrap();
        assert!(snap.messages.loading);
        assert!(stream.current().messages.loading);
    }

    #[tokio::test]
    async fn old_snapshots_are_not_mutated() {
        let store = Store::new();
        let before = store.snapshot();

        store.dispatch(MessageAction::Send(Phase::Success(Message {
            id: "m1".into(),
            ..Message::default()
        })));

        assert!(before.messages.messages.is_empty());
        assert_eq!(store.snapshot().messages.messages.len(), 1);
    }

    #[tokio::test]
    async fn action_log_sees_dispatches() {
        let store = Store::new();
        let mut log = store.subscribe_actions();

        store.dispatch(MessageAction::Fetch(Phase::Request));
        store.dispatch(MessageAction::Fetch(Phase::Failure("boom".into())));

        assert_eq!(log.recv().await.unwrap().kind(), "FETCH_MESSAGES_REQUEST");
        assert_eq!(log.recv().await.unwrap().kind(), "FETCH_MESSAGES_FAILURE");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn logged_actions_are_already_reduced() {
        let store = Store::new();
        let mut log = store.subscribe_actions();
        let observer = store.clone();

        let listener = tokio::spawn(async move {
            for _ in 0..50 {
                let Action::Messages(MessageAction::Send(Phase::Success(sent))) =
                    log.recv().await.unwrap()
                else {
                    panic!("unexpected action");
                };
                let snapshot = observer.snapshot();
                assert!(snapshot.messages.messages.iter().any(|m| m.id == sent.id));
            }
        });

        for i in 0..50 {
            store.dispatch(MessageAction::Send(Phase::Success(Message {
                id: format!("m{i}"),
                ..Message::default()
            })));
        }

        listener.await.unwrap();
    }

    #[tokio::test]
    async fn stream_yields_latest_snapshot() {
        let store = Store::new();
        let mut stream = store.subscribe().into_stream();

        let first = stream.next().await.unwrap();
        assert!(!first.messages.loading);

        store.dispatch(MessageAction::Fetch(Phase::Request));
        let second = stream.next().await.unwrap();
        assert!(second.messages.loading);
    }
}

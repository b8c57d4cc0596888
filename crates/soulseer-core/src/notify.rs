// ── Global error channel ──
//
// Fire-and-forget notifications for failures the user should see no matter
// which view triggered them. Consumers either subscribe to the stream of
// messages or read the latest one.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::warn;

const ERROR_CHANNEL_SIZE: usize = 64;

/// Process-wide error notifications. Cheaply cloneable.
#[derive(Clone)]
pub struct ErrorChannel {
    events: broadcast::Sender<Arc<str>>,
    latest: watch::Sender<Option<Arc<str>>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(ERROR_CHANNEL_SIZE);
        let (latest, _) = watch::channel(None);
        Self { events, latest }
    }

    /// Publish a message. Never fails; with no subscribers the message is
    /// only kept as `latest`.
    pub fn publish(&self, message: impl Into<Arc<str>>) {
        let message = message.into();
        warn!(error = %message, "error published");
        let _ = self.events.send(Arc::clone(&message));
        self.latest.send_replace(Some(message));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.events.subscribe()
    }

    /// The most recent message, until cleared.
    pub fn latest(&self) -> Option<Arc<str>> {
        self.latest.borrow().clone()
    }

    pub fn clear(&self) {
        self.latest.send_replace(None);
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscribers_and_latest() {
        let errors = ErrorChannel::new();
        let mut rx = errors.subscribe();

        errors.publish("Error sending message");

        assert_eq!(&*rx.recv().await.unwrap(), "Error sending message");
        assert_eq!(errors.latest().as_deref(), Some("Error sending message"));

        errors.clear();
        assert_eq!(errors.latest(), None);
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let errors = ErrorChannel::new();
        errors.publish(String::from("offline"));
        assert_eq!(errors.latest().as_deref(), Some("offline"));
    }
}

// ── Marketplace facade ──
//
// The main entry point for consumers. Owns the session, the store and the
// global error channel, and exposes every action creator as an async
// method. Action creators live in per-resource files (messages, products,
// payments), each adding an `impl Marketplace` block.

mod messages;
mod payments;
mod products;

use std::sync::Arc;

use secrecy::SecretString;
use soulseer_api::ApiClient;
use tracing::debug;

use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, Operation};
use crate::error::CoreError;
use crate::notify::ErrorChannel;
use crate::payment::{PaymentGateway, StripeGateway};
use crate::session::Session;
use crate::store::{AppState, StateStream, Store};

/// Cheaply cloneable handle to one client session.
#[derive(Clone)]
pub struct Marketplace {
    inner: Arc<MarketplaceInner>,
}

struct MarketplaceInner {
    dispatcher: Dispatcher,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl Marketplace {
    /// Build a client from configuration. No network traffic happens here.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let api = ApiClient::new(config.api_url.clone(), &transport)?;

        let gateway: Option<Arc<dyn PaymentGateway>> = match config.stripe {
            Some(ref stripe) => Some(Arc::new(StripeGateway::new(stripe, &transport)?)),
            None => None,
        };

        Ok(Self::from_parts(api, config.token.clone(), gateway))
    }

    /// Assemble a client from pre-built parts (custom HTTP client or a
    /// different payment gateway).
    pub fn from_parts(
        api: ApiClient,
        token: Option<SecretString>,
        gateway: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        let session = Arc::new(Session::new(api, token));
        let dispatcher = Dispatcher::new(session, Store::new(), ErrorChannel::new());
        Self {
            inner: Arc::new(MarketplaceInner {
                dispatcher,
                gateway,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn session(&self) -> &Arc<Session> {
        self.inner.dispatcher.session()
    }

    pub fn store(&self) -> &Store {
        self.inner.dispatcher.store()
    }

    pub fn errors(&self) -> &ErrorChannel {
        self.inner.dispatcher.errors()
    }

    /// The latest state snapshot.
    pub fn state(&self) -> Arc<AppState> {
        self.store().snapshot()
    }

    pub fn subscribe(&self) -> StateStream {
        self.store().subscribe()
    }

    fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// The payment gateway, or a FAILURE for `op` when none is configured.
    fn gateway<T>(&self, op: &Operation<T>) -> Result<&Arc<dyn PaymentGateway>, CoreError> {
        self.inner.gateway.as_ref().ok_or_else(|| {
            self.dispatcher().fail(
                op,
                CoreError::Config {
                    message: "Card payments need a Stripe publishable key".into(),
                },
            )
        })
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in and keep the issued token for subsequent requests.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, CoreError> {
        self.session().login(email, password).await.inspect_err(|e| {
            self.errors().publish(e.failure_message());
        })
    }

    /// Log out. The local token is destroyed even if the backend call fails.
    pub async fn logout(&self) {
        self.session().logout().await;
        debug!("session cleared");
    }
}

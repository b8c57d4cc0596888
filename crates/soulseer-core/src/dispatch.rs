// ── Request/retry/dispatch protocol ──
//
// Every action creator runs through here:
//
//   REQUEST → HTTP call → 401? refresh once, replay once → SUCCESS | FAILURE
//
// FAILURE always carries a user-facing message (the backend's `message`, or
// the operation's fallback) and is mirrored on the global error channel.
// SUCCESS is a separate step (`complete`) so chained flows can defer it
// until the whole chain has finished.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use soulseer_api::ApiRequest;
use tracing::{debug, warn};

use crate::action::{Action, Phase};
use crate::error::CoreError;
use crate::notify::ErrorChannel;
use crate::payment::GatewayError;
use crate::session::Session;
use crate::store::Store;

/// How many times a request is replayed after a successful token refresh.
pub const MAX_REPLAYS: usize = 1;

/// One action-creator operation: how to wrap its phases into an `Action`,
/// and what to show when the backend gives no message.
pub struct Operation<T> {
    pub wrap: fn(Phase<T>) -> Action,
    pub fallback: &'static str,
}

/// Which part of a success body is the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The `data` field (most endpoints).
    Data,
    /// The whole body (listing endpoints with pagination).
    Body,
}

/// Shared context for running operations against the store.
#[derive(Clone)]
pub struct Dispatcher {
    session: Arc<Session>,
    store: Store,
    errors: ErrorChannel,
}

impl Dispatcher {
    pub fn new(session: Arc<Session>, store: Store, errors: ErrorChannel) -> Self {
        Self {
            session,
            store,
            errors,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    // ── Phases ───────────────────────────────────────────────────────

    /// Dispatch the operation's REQUEST action.
    pub fn announce<T>(&self, op: &Operation<T>) {
        self.store.dispatch((op.wrap)(Phase::Request));
    }

    /// Dispatch the operation's SUCCESS action.
    pub fn complete<T>(&self, op: &Operation<T>, payload: T) {
        self.store.dispatch((op.wrap)(Phase::Success(payload)));
    }

    /// Dispatch the operation's FAILURE action, publish the message
    /// globally, and hand the error back for propagation.
    pub fn fail<T>(&self, op: &Operation<T>, err: CoreError) -> CoreError {
        let message = err.failure_message();
        self.store.dispatch((op.wrap)(Phase::Failure(message.clone())));
        self.errors.publish(message);
        err
    }

    // ── Execution ────────────────────────────────────────────────────

    /// REQUEST, then the call with refresh-and-replay. Dispatches FAILURE on
    /// error; SUCCESS is left to the caller.
    pub async fn execute<T, R: DeserializeOwned>(
        &self,
        op: &Operation<T>,
        request: &ApiRequest,
        envelope: Envelope,
    ) -> Result<R, CoreError> {
        self.announce(op);
        self.call(op, request, envelope).await
    }

    /// Full cycle for operations whose response is the SUCCESS payload.
    pub async fn run<T: DeserializeOwned + Clone>(
        &self,
        op: &Operation<T>,
        request: &ApiRequest,
        envelope: Envelope,
    ) -> Result<T, CoreError> {
        let payload: T = self.execute(op, request, envelope).await?;
        self.complete(op, payload.clone());
        Ok(payload)
    }

    /// The call step alone: no REQUEST, FAILURE on error.
    pub async fn call<T, R: DeserializeOwned>(
        &self,
        op: &Operation<T>,
        request: &ApiRequest,
        envelope: Envelope,
    ) -> Result<R, CoreError> {
        let body = self.call_raw(op, request).await?;
        let decoded = match envelope {
            Envelope::Data => soulseer_api::decode_data(&body),
            Envelope::Body => soulseer_api::decode(&body),
        };
        decoded.map_err(|e| {
            warn!(error = %e, path = %request.path, "undecodable response");
            self.fail(op, CoreError::from_api(&e, op.fallback))
        })
    }

    /// REQUEST, then a call whose response body is irrelevant.
    pub async fn execute_empty<T>(
        &self,
        op: &Operation<T>,
        request: &ApiRequest,
    ) -> Result<(), CoreError> {
        self.announce(op);
        self.call_raw(op, request).await.map(drop)
    }

    /// Run a payment SDK call as a step of `op`. SDK errors become FAILURE.
    pub async fn execute_gateway<T, R, F>(&self, op: &Operation<T>, call: F) -> Result<R, CoreError>
    where
        F: Future<Output = Result<R, GatewayError>>,
    {
        call.await.map_err(|e| self.fail(op, e.into()))
    }

    /// Send the request, refreshing the token and replaying on 401.
    async fn call_raw<T>(&self, op: &Operation<T>, request: &ApiRequest) -> Result<String, CoreError> {
        let api = self.session.api();

        if !request.auth {
            return api
                .send_raw(request, None)
                .await
                .map_err(|e| self.fail(op, CoreError::from_api(&e, op.fallback)));
        }

        let mut sent = self.session.snapshot().await;
        let mut replays = 0;
        loop {
            debug!(
                method = %request.method,
                path = %request.path,
                replay = replays,
                "calling backend"
            );
            match api.send_raw(request, sent.token.as_ref()).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_auth_expired() && replays < MAX_REPLAYS => {
                    debug!(path = %request.path, "unauthorized; refreshing session token");
                    match self.session.refresh_from(sent.generation).await {
                        Ok(fresh) => {
                            sent = fresh;
                            replays += 1;
                        }
                        Err(expired) => return Err(self.fail(op, expired)),
                    }
                }
                Err(e) => return Err(self.fail(op, CoreError::from_api(&e, op.fallback))),
            }
        }
    }
}

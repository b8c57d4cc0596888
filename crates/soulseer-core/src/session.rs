// ── Session token ownership ──
//
// The session token is the only shared mutable state in the client. Every
// authenticated request reads it; login, refresh and logout replace it.
// Each replacement bumps a generation counter so a request that got a 401
// can tell whether somebody else already renewed the token it sent.

use secrecy::SecretString;
use soulseer_api::ApiClient;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// The token a request was sent with, tagged with its generation.
#[derive(Debug, Clone)]
pub struct TokenSnapshot {
    pub token: Option<SecretString>,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<SecretString>,
    generation: u64,
    /// Generation whose refresh already failed. Further refreshes from the
    /// same generation fail immediately instead of calling the backend.
    expired: Option<u64>,
}

/// Owner of the session token and its refresh gate.
pub struct Session {
    api: ApiClient,
    state: RwLock<TokenState>,
    refresh_gate: Mutex<()>,
}

impl Session {
    pub fn new(api: ApiClient, token: Option<SecretString>) -> Self {
        Self {
            api,
            state: RwLock::new(TokenState {
                token,
                ..TokenState::default()
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    /// The HTTP client this session authenticates.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The current token and its generation.
    pub async fn snapshot(&self) -> TokenSnapshot {
        let state = self.state.read().await;
        TokenSnapshot {
            token: state.token.clone(),
            generation: state.generation,
        }
    }

    pub async fn token(&self) -> Option<SecretString> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Replace the token (or clear it) and start a new generation.
    pub async fn set_token(&self, token: Option<SecretString>) {
        let mut state = self.state.write().await;
        state.token = token;
        state.generation += 1;
        state.expired = None;
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Exchange credentials for a token and make it current.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, CoreError> {
        let token = self
            .api
            .login(email, password)
            .await
            .map_err(|e| CoreError::from_api(&e, "Login failed"))?;
        self.set_token(Some(token.clone())).await;
        info!(email, "logged in");
        Ok(token)
    }

    /// End the session.
    ///
    /// The backend call is best effort: the local token is destroyed even
    /// when the call fails.
    pub async fn logout(&self) {
        let token = self.token().await;
        if token.is_some() {
            if let Err(e) = self.api.logout(token.as_ref()).await {
                warn!(error = %e, "logout request failed; clearing local session anyway");
            }
        }
        self.set_token(None).await;
        info!("logged out");
    }

    /// Renew the token a failed request was sent with.
    ///
    /// Refreshes are serialized through the gate. When the generation has
    /// moved past `seen`, another task already replaced the token and the
    /// current one is returned without calling the backend.
    pub async fn refresh_from(&self, seen: u64) -> Result<TokenSnapshot, CoreError> {
        let _gate = self.refresh_gate.lock().await;

        let stale = {
            let state = self.state.read().await;
            if state.generation != seen {
                debug!(
                    seen,
                    current = state.generation,
                    "token already renewed by a concurrent request"
                );
                return Ok(TokenSnapshot {
                    token: state.token.clone(),
                    generation: state.generation,
                });
            }
            if state.expired == Some(seen) {
                return Err(CoreError::SessionExpired);
            }
            state.token.clone()
        };

        match self.api.refresh_token(stale.as_ref()).await {
            Ok(fresh) => {
                let mut state = self.state.write().await;
                state.token = Some(fresh);
                state.generation += 1;
                state.expired = None;
                debug!(generation = state.generation, "session token refreshed");
                Ok(TokenSnapshot {
                    token: state.token.clone(),
                    generation: state.generation,
                })
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                self.state.write().await.expired = Some(seen);
                Err(CoreError::SessionExpired)
            }
        }
    }
}

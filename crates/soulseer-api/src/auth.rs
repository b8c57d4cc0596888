// Token authentication
//
// The backend issues an opaque token on login; every authenticated call
// carries it in the `x-auth-token` header. Expiry is implicit: the backend
// answers 401 and the client exchanges the stale token at the refresh
// endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::secret;
use crate::request::ApiRequest;

/// Request header carrying the session token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Token response. Accepts both `{ "data": { "token": ... } }` and the bare
/// `{ "token": ... }` shape older routes still return.
#[derive(Deserialize)]
struct TokenBody {
    #[serde(default)]
    data: Option<TokenData>,
    #[serde(default, deserialize_with = "secret::optional")]
    token: Option<SecretString>,
}

#[derive(Deserialize)]
struct TokenData {
    #[serde(deserialize_with = "secret::required")]
    token: SecretString,
}

impl TokenBody {
    fn into_token(self) -> Result<SecretString, Error> {
        self.data
            .map(|d| d.token)
            .or(self.token)
            .ok_or_else(|| Error::Deserialization {
                message: "token missing from auth response".into(),
                body: String::new(),
            })
    }
}

/// `POST /api/auth/login`
pub fn login(email: &str, password: &SecretString) -> ApiRequest {
    ApiRequest::post("auth/login")
        .public()
        .with_body(json!({
            "email": email,
            "password": password.expose_secret(),
        }))
}

/// `POST /api/auth/refresh`, authenticated with the stale token.
pub fn refresh() -> ApiRequest {
    ApiRequest::post("auth/refresh")
}

/// `POST /api/auth/logout`
pub fn logout() -> ApiRequest {
    ApiRequest::post("auth/logout")
}

impl ApiClient {
    /// Exchange credentials for a session token.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        debug!(email, "logging in");
        let body: TokenBody = self.send_body(&login(email, password), None).await?;
        let token = body.into_token()?;
        debug!("login successful");
        Ok(token)
    }

    /// Exchange an expired or invalid token for a fresh one.
    ///
    /// A 401 here means the session cannot be renewed and the user has to
    /// log in again.
    pub async fn refresh_token(&self, token: Option<&SecretString>) -> Result<SecretString, Error> {
        debug!("refreshing session token");
        let body: TokenBody = self.send_body(&refresh(), token).await?;
        body.into_token()
    }

    /// End the session on the backend.
    pub async fn logout(&self, token: Option<&SecretString>) -> Result<(), Error> {
        debug!("logging out");
        self.send_empty(&logout(), token).await
    }
}

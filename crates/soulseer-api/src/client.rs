// REST API HTTP client
//
// Wraps `reqwest::Client` with SoulSeer-specific URL construction, auth
// header injection, and `{ data }` / `{ message }` envelope handling. Endpoint
// descriptors live in the per-resource modules (messages, products, stripe);
// this module only knows how to execute them.

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::AUTH_HEADER;
use crate::error::Error;
use crate::request::{ApiRequest, Method};
use crate::transport::TransportConfig;

/// Success envelope: `{ "data": ... }`.
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Error envelope: `{ "message": "..." }`, or the validator shape
/// `{ "errors": [{ "msg": "..." }] }` some routes return.
#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ValidationEntry>,
}

#[derive(Deserialize)]
struct ValidationEntry {
    #[serde(default)]
    msg: Option<String>,
}

/// Raw HTTP client for the SoulSeer backend.
///
/// All methods take an optional token; when the request descriptor is marked
/// authenticated the token is sent in the `x-auth-token` header. Status
/// handling is uniform: 2xx returns the decoded body, 401 becomes
/// [`Error::Unauthorized`], anything else becomes [`Error::Api`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `https://soulseer.app`); every
    /// request path is resolved under `{base_url}/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Execute a request and unwrap the `{ data }` envelope.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let body = self.send_raw(request, token).await?;
        decode_data(&body)
    }

    /// Execute a request and decode the whole response body.
    ///
    /// Listing endpoints return `{ data, pagination }`; callers that need
    /// the pagination block use this instead of [`send`](Self::send).
    pub async fn send_body<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let body = self.send_raw(request, token).await?;
        decode(&body)
    }

    /// Execute a request whose success body is irrelevant.
    pub async fn send_empty(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<(), Error> {
        self.send_raw(request, token).await.map(|_| ())
    }

    /// Send the request and return the raw success body.
    ///
    /// Callers that retry on 401 use this and decode afterwards with
    /// [`decode_data`] or [`decode`].
    pub async fn send_raw(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<String, Error> {
        let url = self.api_url(&request.path)?;
        debug!(method = %request.method, auth = request.auth, "{} {url}", request.method);

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        if request.auth {
            if let Some(token) = token {
                builder = builder.header(AUTH_HEADER, header_value(token)?);
            } else {
                trace!("authenticated request sent without a token");
            }
        }

        let resp = builder.send().await?;
        read_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

fn header_value(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(token.expose_secret())
        .map_err(|e| Error::InvalidHeader(format!("{AUTH_HEADER}: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Map the status to success or a structured error, returning the body text.
pub(crate) async fn read_response(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(&body);
    trace!(status = status.as_u16(), ?message, "request failed");

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized { message });
    }

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Extract the backend-provided message from an error body, if any.
fn error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| envelope.errors.into_iter().find_map(|e| e.msg))
}

/// Decode a success body and unwrap its `{ data }` envelope.
pub fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let envelope: DataEnvelope<T> = decode(body)?;
    Ok(envelope.data)
}

/// Decode a whole success body.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_under_api_root() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://soulseer.app/").unwrap(),
        );
        assert_eq!(
            client.api_url("/messages/payment").unwrap().as_str(),
            "https://soulseer.app/api/messages/payment"
        );
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Product not found"}"#).as_deref(),
            Some("Product not found")
        );
        assert_eq!(
            error_message(r#"{"errors":[{"msg":"Price must be positive"}]}"#).as_deref(),
            Some("Price must be positive")
        );
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"message":""}"#), None);
    }
}

use thiserror::Error;

/// Top-level error type for the `soulseer-api` crate.
///
/// Covers every failure mode of the REST surface: rejected credentials,
/// backend errors carried in the `{ message }` envelope, transport and
/// decoding failures. `soulseer-core` maps these into its domain taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401: token missing, expired, or revoked.
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("invalid or expired token"))]
    Unauthorized { message: Option<String> },

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response other than 401. `message` is the backend's
    /// `{ "message": "..." }` field when the body carried one.
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Header value rejected by the HTTP stack (e.g. a token with newlines).
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credential was rejected and a token refresh
    /// might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The human-readable message supplied by the backend, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` when no HTTP response was received at all.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

// ── Core error types ──
//
// User-facing errors from soulseer-core. The dispatch protocol classifies
// every transport failure into one of these variants; the variant's message
// is exactly what lands in the slice `error` field and on the global error
// channel.

use thiserror::Error;

/// Message shown when a 401 could not be resolved by refreshing the token.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Request errors ───────────────────────────────────────────────
    /// 4xx other than 401: the backend rejected the request.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// 5xx: the backend failed while handling the request.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No response was received (connection refused, DNS, timeout).
    #[error("{message}")]
    Network { message: String },

    // ── Session errors ───────────────────────────────────────────────
    /// 401 after the token refresh failed.
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    // ── Payment errors ───────────────────────────────────────────────
    /// The payment SDK reported an error or a non-successful intent.
    #[error("{message}")]
    PaymentDeclined {
        message: String,
        /// SDK error or decline code, when one was reported.
        code: Option<String>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Fallback ─────────────────────────────────────────────────────
    /// Anything else, e.g. an undecodable success body.
    #[error("{message}")]
    Unknown { message: String },
}

impl CoreError {
    /// Classify a transport-layer failure.
    ///
    /// The message is the backend's `{ message }` when it sent one, the
    /// operation's `fallback` otherwise.
    pub fn from_api(err: &soulseer_api::Error, fallback: &str) -> Self {
        use soulseer_api::Error as Api;

        let message = err.backend_message().unwrap_or(fallback).to_owned();
        match err {
            Api::Unauthorized { .. } => Self::Validation {
                status: 401,
                message,
            },
            Api::Api { status, .. } if *status >= 500 => Self::Server {
                status: *status,
                message,
            },
            Api::Api { status, .. } => Self::Validation {
                status: *status,
                message,
            },
            Api::Transport(_) if err.is_network() => Self::Network { message },
            Api::Transport(e) => match e.status() {
                Some(status) if status.is_server_error() => Self::Server {
                    status: status.as_u16(),
                    message,
                },
                _ => Self::Network { message },
            },
            Api::InvalidUrl(_) | Api::Tls(_) | Api::InvalidHeader(_) => Self::Config {
                message: err.to_string(),
            },
            Api::Deserialization { .. } => Self::Unknown { message },
        }
    }

    /// The text recorded as a FAILURE payload and published globally.
    pub fn failure_message(&self) -> String {
        match self {
            Self::Config { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status behind the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

impl From<soulseer_api::Error> for CoreError {
    fn from(err: soulseer_api::Error) -> Self {
        let fallback = err.to_string();
        Self::from_api(&err, &fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_wins_over_fallback() {
        let err = soulseer_api::Error::Api {
            status: 422,
            message: Some("Price must be positive".into()),
        };
        assert_eq!(
            CoreError::from_api(&err, "Error creating product"),
            CoreError::Validation {
                status: 422,
                message: "Price must be positive".into(),
            }
        );
    }

    #[test]
    fn fallback_used_without_backend_message() {
        let err = soulseer_api::Error::Api {
            status: 503,
            message: None,
        };
        let core = CoreError::from_api(&err, "Error fetching products");
        assert_eq!(
            core,
            CoreError::Server {
                status: 503,
                message: "Error fetching products".into(),
            }
        );
        assert_eq!(core.failure_message(), "Error fetching products");
    }

    #[test]
    fn undecodable_body_is_unknown() {
        let err = soulseer_api::Error::Deserialization {
            message: "missing field `data`".into(),
            body: "{}".into(),
        };
        assert_eq!(
            CoreError::from_api(&err, "Error fetching product"),
            CoreError::Unknown {
                message: "Error fetching product".into(),
            }
        );
    }

    #[test]
    fn session_expired_has_fixed_message() {
        assert_eq!(
            CoreError::SessionExpired.failure_message(),
            "Your session has expired. Please log in again."
        );
    }
}

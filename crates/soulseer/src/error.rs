//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use soulseer_config::ConfigError;
use soulseer_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const PAYMENT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the SoulSeer backend: {message}")]
    #[diagnostic(
        code(soulseer::connection_failed),
        help(
            "Check the backend URL and your network connection.\n\
             Override the URL with --api-url or: soulseer config set api_url <url>"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Backend error (HTTP {status}): {message}")]
    #[diagnostic(code(soulseer::server_error), help("The backend failed; try again shortly."))]
    Server { status: u16, message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Your session has expired")]
    #[diagnostic(
        code(soulseer::session_expired),
        help("Log in again with: soulseer auth login")
    )]
    SessionExpired,

    #[error("Not authorized: {message}")]
    #[diagnostic(
        code(soulseer::unauthorized),
        help("This command needs a session. Run: soulseer auth login")
    )]
    Unauthorized { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(soulseer::api_error))]
    Api { status: u16, message: String },

    #[error("Payment declined: {message}")]
    #[diagnostic(
        code(soulseer::payment_declined),
        help("Decline code: {code}")
    )]
    PaymentDeclined { message: String, code: String },

    #[error("{message}")]
    #[diagnostic(code(soulseer::unexpected))]
    Unexpected { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(soulseer::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(soulseer::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: soulseer config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("{message}")]
    #[diagnostic(
        code(soulseer::config),
        help(
            "Review the profile with: soulseer config show\n\
             Card payments also need a Stripe key (--stripe-key or stripe_publishable_key)."
        )
    )]
    ClientConfig { message: String },

    #[error(transparent)]
    #[diagnostic(code(soulseer::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(soulseer::keyring),
        help("Pass the token with --token or SOULSEER_TOKEN when no keyring is available.")
    )]
    Keyring { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(soulseer::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(soulseer::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::SessionExpired | Self::Unauthorized { .. } | Self::Keyring { .. } => {
                exit_code::AUTH
            }
            Self::Api { status, .. } => match status {
                403 => exit_code::PERMISSION,
                404 => exit_code::NOT_FOUND,
                409 => exit_code::CONFLICT,
                _ => exit_code::GENERAL,
            },
            Self::PaymentDeclined { .. } => exit_code::PAYMENT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation {
                status: 401,
                message,
            } => CliError::Unauthorized { message },
            CoreError::Validation { status, message } => CliError::Api { status, message },
            CoreError::Server { status, message } => CliError::Server { status, message },
            CoreError::Network { message } => CliError::ConnectionFailed { message },
            CoreError::SessionExpired => CliError::SessionExpired,
            CoreError::PaymentDeclined { message, code } => CliError::PaymentDeclined {
                message,
                code: code.unwrap_or_else(|| "none".into()),
            },
            CoreError::Config { message } => CliError::ClientConfig { message },
            CoreError::Unknown { message } => CliError::Unexpected { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: soulseer config profiles)".into(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

// ── Runtime client configuration ──
//
// These types describe *how* to reach the SoulSeer backend and the payment
// SDK. They carry credential data and connection tuning, but never touch
// disk. The CLI constructs a `ClientConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use soulseer_api::{TlsMode, TransportConfig};
use url::Url;

/// Default Stripe REST root used by [`StripeConfig::new`].
pub const STRIPE_API_URL: &str = "https://api.stripe.com/";

/// Default hosted-checkout root used by [`StripeConfig::new`].
pub const STRIPE_CHECKOUT_URL: &str = "https://checkout.stripe.com/";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (local development backends).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Client-side payment SDK settings.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Publishable key (`pk_...`). Safe to ship to clients, but still kept
    /// out of logs.
    pub publishable_key: SecretString,
    /// Stripe REST root.
    pub api_url: Url,
    /// Hosted checkout root used to build redirect URLs.
    pub checkout_url: Url,
}

impl StripeConfig {
    /// Settings pointing at Stripe's production endpoints.
    pub fn new(publishable_key: SecretString) -> Result<Self, url::ParseError> {
        Ok(Self {
            publishable_key,
            api_url: Url::parse(STRIPE_API_URL)?,
            checkout_url: Url::parse(STRIPE_CHECKOUT_URL)?,
        })
    }
}

/// Configuration for one backend connection.
///
/// Built by the CLI, passed to `Marketplace` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root (e.g., `https://soulseer.app`).
    pub api_url: Url,
    /// Session token from a previous login, if any.
    pub token: Option<SecretString>,
    /// Payment SDK settings. Card flows fail with a config error without it.
    pub stripe: Option<StripeConfig>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token: None,
            stripe: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_stripe(mut self, stripe: StripeConfig) -> Self {
        self.stripe = Some(stripe);
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }
}

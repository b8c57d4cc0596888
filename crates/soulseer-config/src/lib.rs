//! Shared configuration for SoulSeer tools.
//!
//! TOML profiles, session-token storage (env + keyring + plaintext), and
//! translation to `soulseer_core::ClientConfig`. The CLI layers its
//! `GlobalOpts` overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use soulseer_core::{ClientConfig, StripeConfig, TlsVerification};

/// Keyring service name under which session tokens are stored.
pub const KEYRING_SERVICE: &str = "soulseer";

/// Backend used when a profile does not name one.
pub const DEFAULT_API_URL: &str = "https://soulseer.app";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile to use: `requested`, else `default_profile`, else "default".
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend root (e.g., "https://soulseer.app").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Account email, remembered for `auth login`.
    pub email: Option<String>,

    /// Session token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the session token.
    pub token_env: Option<String>,

    /// Stripe publishable key (`pk_...`).
    pub stripe_publishable_key: Option<String>,

    /// Environment variable name containing the publishable key.
    pub stripe_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (local development backends).
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            email: None,
            token: None,
            token_env: None,
            stripe_publishable_key: None,
            stripe_key_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "soulseer", "soulseer").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("soulseer");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered under `SOULSEER_` environment
/// variables (`__` separates nesting, e.g. `SOULSEER_DEFAULTS__OUTPUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SOULSEER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn token_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Where a resolved session token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Env,
    Keyring,
    Plaintext,
}

/// Resolve the session token: `token_env` → system keyring → plaintext.
///
/// `None` means anonymous; catalogue reads still work without a token.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_token_with_source(profile, profile_name).map(|(token, _)| token)
}

/// Like [`resolve_token`], also reporting which store the token came from.
pub fn resolve_token_with_source(
    profile: &Profile,
    profile_name: &str,
) -> Option<(SecretString, TokenSource)> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some((SecretString::from(val), TokenSource::Env));
        }
    }

    // 2. System keyring
    if let Ok(entry) = token_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some((SecretString::from(secret), TokenSource::Keyring));
        }
    }

    // 3. Plaintext in config
    profile
        .token
        .clone()
        .map(|token| (SecretString::from(token), TokenSource::Plaintext))
}

/// Persist a session token in the system keyring after login.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    token_entry(profile_name)?.set_password(token.expose_secret())?;
    debug!(profile = profile_name, "session token stored in keyring");
    Ok(())
}

/// Remove a stored session token. A missing entry is not an error.
pub fn forget_token(profile_name: &str) -> Result<(), ConfigError> {
    match token_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the Stripe publishable key: `stripe_key_env` → plaintext.
pub fn resolve_stripe_key(profile: &Profile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.stripe_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    profile
        .stripe_publishable_key
        .clone()
        .map(SecretString::from)
}

// ── Translation ─────────────────────────────────────────────────────

/// TLS strategy for a profile: `insecure` wins over `ca_cert`.
pub fn profile_tls(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ClientConfig` from a profile, with no CLI overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ClientConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let mut config = ClientConfig::new(api_url);
    config.tls = profile_tls(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));

    if let Some(token) = resolve_token(profile, profile_name) {
        config = config.with_token(token);
    }
    if let Some(key) = resolve_stripe_key(profile) {
        let stripe = StripeConfig::new(key).map_err(|e| ConfigError::Validation {
            field: "stripe".into(),
            reason: e.to_string(),
        })?;
        config = config.with_stripe(stripe);
    }

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "staging"

[defaults]
output = "json"
timeout = 10

[profiles.staging]
api_url = "https://staging.soulseer.test"
email = "reader@soulseer.test"
token = "plain-token"
stripe_publishable_key = "pk_test_123"
insecure = true
timeout = 5

[profiles.minimal]
"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&write_sample(&dir)).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("staging"));
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.color, "auto");

        let staging = config.profile("staging").unwrap();
        assert_eq!(staging.email.as_deref(), Some("reader@soulseer.test"));
        assert_eq!(staging.insecure, Some(true));

        let minimal = config.profile("minimal").unwrap();
        assert_eq!(minimal.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.output, "table");
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profile_name_precedence() {
        let config = Config::default();
        assert_eq!(config.profile_name(Some("other")), "other");
        assert_eq!(config.profile_name(None), "default");

        let unnamed = Config {
            default_profile: None,
            ..Config::default()
        };
        assert_eq!(unnamed.profile_name(None), "default");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = Config::default().profile("nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { ref name } if name == "nope"));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                api_url: "http://localhost:5000".into(),
                email: Some("a@b.test".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, config.profiles);
    }

    #[test]
    fn client_config_from_profile() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&write_sample(&dir)).unwrap();
        let profile = config.profile("staging").unwrap();

        let client = profile_to_client_config(profile, "soulseer-config-test").unwrap();

        assert_eq!(client.api_url.as_str(), "https://staging.soulseer.test/");
        assert_eq!(client.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert!(client.token.is_some());
        assert_eq!(
            client.stripe.unwrap().publishable_key.expose_secret(),
            "pk_test_123"
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, "x").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn tls_prefers_insecure_over_ca() {
        let mut profile = Profile {
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            ..Profile::default()
        };
        assert_eq!(
            profile_tls(&profile),
            TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem"))
        );

        profile.insecure = Some(true);
        assert_eq!(profile_tls(&profile), TlsVerification::DangerAcceptInvalid);

        assert_eq!(profile_tls(&Profile::default()), TlsVerification::SystemDefaults);
    }

    #[test]
    fn token_source_follows_resolution_order() {
        let mut profile = Profile {
            token: Some("plain-token".into()),
            token_env: Some("SOULSEER_TEST_UNSET_TOKEN".into()),
            ..Profile::default()
        };
        let (token, source) =
            resolve_token_with_source(&profile, "soulseer-config-test-unstored").unwrap();
        assert_eq!(token.expose_secret(), "plain-token");
        assert_eq!(source, TokenSource::Plaintext);

        profile.token_env = Some("PATH".into());
        let (_, source) =
            resolve_token_with_source(&profile, "soulseer-config-test-unstored").unwrap();
        assert_eq!(source, TokenSource::Env);
    }

    #[test]
    fn stripe_key_falls_back_to_plaintext() {
        let profile = Profile {
            stripe_publishable_key: Some("pk_live_x".into()),
            stripe_key_env: Some("SOULSEER_TEST_UNSET_STRIPE_KEY".into()),
            ..Profile::default()
        };
        assert_eq!(
            resolve_stripe_key(&profile).unwrap().expose_secret(),
            "pk_live_x"
        );
        assert!(resolve_stripe_key(&Profile::default()).is_none());
    }
}

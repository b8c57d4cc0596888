//! CLI configuration: thin wrapper around `soulseer_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, --stripe-key, ...).

use std::time::Duration;

use secrecy::SecretString;

use soulseer_core::{ClientConfig, StripeConfig, TlsVerification, TokenSnapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use soulseer_config::{
    Config, Profile, TokenSource, config_path, forget_token, load_config_or_default, save_config,
    store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Names of all configured profiles, for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Connection settings resolved for one invocation.
pub struct Resolved {
    pub client: ClientConfig,
    pub profile_name: String,
    /// `None` for an anonymous session or a token passed with `--token`.
    pub token_source: Option<TokenSource>,
}

/// Build the `ClientConfig` for this invocation.
///
/// An explicitly requested profile must exist; otherwise a missing profile
/// falls back to built-in defaults so catalogue commands work without any
/// configuration.
pub fn build_client_config(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    let (client, token_source) = resolve_profile(&profile, &profile_name, global)?;
    Ok(Resolved {
        client,
        profile_name,
        token_source,
    })
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(ClientConfig, Option<TokenSource>), CliError> {
    // 1. Backend URL (flag > env > profile)
    let url_str = global.api_url.as_deref().unwrap_or(&profile.api_url);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let mut config = ClientConfig::new(url);

    // 2. Session token (flag > token_env > keyring > plaintext)
    let (token, token_source) = match global.token {
        Some(ref token) => (Some(SecretString::from(token.clone())), None),
        None => match soulseer_config::resolve_token_with_source(profile, profile_name) {
            Some((token, source)) => (Some(token), Some(source)),
            None => (None, None),
        },
    };
    if let Some(token) = token {
        config = config.with_token(token);
    }

    // 3. Stripe publishable key
    let stripe_key = match global.stripe_key {
        Some(ref key) => Some(SecretString::from(key.clone())),
        None => soulseer_config::resolve_stripe_key(profile),
    };
    if let Some(key) = stripe_key {
        let stripe = StripeConfig::new(key).map_err(|e| CliError::Validation {
            field: "stripe".into(),
            reason: e.to_string(),
        })?;
        config = config.with_stripe(stripe);
    }

    // 4. TLS verification
    config.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        soulseer_config::profile_tls(profile)
    };

    // 5. Timeout (flag > profile > default)
    if let Some(secs) = global.timeout.or(profile.timeout) {
        config.timeout = Duration::from_secs(secs);
    }

    Ok((config, token_source))
}

/// The token to write back to the keyring after a command: set only when
/// the token was loaded from the keyring and the session renewed it since.
pub fn renewed_keyring_token(
    source: Option<TokenSource>,
    started_at: u64,
    now: TokenSnapshot,
) -> Option<SecretString> {
    if source != Some(TokenSource::Keyring) || now.generation == started_at {
        return None;
    }
    now.token
}

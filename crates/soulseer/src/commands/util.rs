//! Shared helpers for command handlers.

use std::path::Path;

use secrecy::SecretString;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Read a secret from `env_var` when given, otherwise prompt without echo.
pub fn read_secret(env_var: Option<&str>, prompt: &str) -> Result<SecretString, CliError> {
    let value = match env_var {
        Some(name) => std::env::var(name).map_err(|_| CliError::Validation {
            field: name.into(),
            reason: "environment variable is not set".into(),
        })?,
        None => rpassword::prompt_password(prompt)?,
    };
    if value.is_empty() {
        return Err(CliError::Validation {
            field: prompt.trim_end_matches([':', ' ']).to_lowercase(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(SecretString::from(value))
}

/// Build `(key, value)` filter pairs, skipping unset values.
pub fn filter_pairs<'a>(pairs: &'a [(&'a str, Option<String>)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
        .collect()
}

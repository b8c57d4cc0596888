//! Auth command handlers: login, logout, session status.

use serde::Serialize;
use tracing::warn;

use soulseer_core::Marketplace;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct SessionStatus {
    profile: String,
    api_url: String,
    authenticated: bool,
}

fn detail(s: &SessionStatus) -> String {
    [
        format!("Profile:       {}", s.profile),
        format!("Backend:       {}", s.api_url),
        format!("Authenticated: {}", output::yes_no(s.authenticated)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    market: &Marketplace,
    args: AuthArgs,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login {
            email,
            password_env,
        } => {
            let email = match email {
                Some(email) => email,
                None => config::load_config_or_default()
                    .profiles
                    .get(profile_name)
                    .and_then(|p| p.email.clone())
                    .ok_or_else(|| CliError::Validation {
                        field: "email".into(),
                        reason: "pass --email or set it with: soulseer config set email <address>"
                            .into(),
                    })?,
            };
            let password = util::read_secret(password_env.as_deref(), "Password: ")?;

            let token = market.login(&email, &password).await?;

            // Keyring failures are not fatal.
            if let Err(e) = config::store_token(profile_name, &token) {
                warn!(error = %e, "could not store session token in keyring");
                eprintln!("Token not stored: {e}. Pass it with --token or SOULSEER_TOKEN.");
            }

            output::success(
                &format!("Logged in as {email} (profile '{profile_name}')"),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        AuthCommand::Logout => {
            market.logout().await;
            if let Err(e) = config::forget_token(profile_name) {
                warn!(error = %e, "could not remove session token from keyring");
            }
            output::success("Logged out", &global.color, global.quiet);
            Ok(())
        }

        AuthCommand::Status => {
            let status = SessionStatus {
                profile: profile_name.to_owned(),
                api_url: market.session().api().base_url().to_string(),
                authenticated: market.session().is_authenticated().await,
            };
            let out = output::render_single(&global.output, &status, detail, |s| {
                output::yes_no(s.authenticated)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

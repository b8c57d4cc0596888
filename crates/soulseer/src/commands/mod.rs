//! Command dispatch: bridges CLI args -> marketplace action creators -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod messages;
pub mod payments;
pub mod products;
pub mod util;

use soulseer_core::Marketplace;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    market: &Marketplace,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(market, args, profile_name, global).await,
        Command::Messages(args) => messages::handle(market, args, global).await,
        Command::Products(args) => products::handle(market, args, global).await,
        Command::Payments(args) => payments::handle(market, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

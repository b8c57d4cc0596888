mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use soulseer_core::Marketplace;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "soulseer", &mut std::io::stdout());
            Ok(())
        }

        // All other commands go through the marketplace client
        cmd => {
            let resolved = config::build_client_config(&cli.global)?;
            let profile_name = resolved.profile_name;
            let market = Marketplace::new(&resolved.client)?;
            let started_at = market.session().snapshot().await.generation;

            tracing::debug!(command = ?cmd, profile = %profile_name, "dispatching command");
            let result = commands::dispatch(cmd, &market, &profile_name, &cli.global).await;

            let now = market.session().snapshot().await;
            if let Some(token) = config::renewed_keyring_token(resolved.token_source, started_at, now)
            {
                // Keyring failures are not fatal.
                if let Err(e) = config::store_token(&profile_name, &token) {
                    tracing::warn!(error = %e, "could not store renewed session token");
                }
            }

            if cli.global.state {
                print_state(&market, &cli.global)?;
            }
            result
        }
    }
}

/// Dump the client state snapshot (every slice) after a command.
fn print_state(market: &Marketplace, global: &GlobalOpts) -> Result<(), CliError> {
    let state = market.state();
    let out = output::render_single(
        &global.output,
        state.as_ref(),
        |s| output::render_yaml(s).unwrap_or_default(),
        |_| "state".into(),
    )?;
    output::print_output(&out, false);
    Ok(())
}

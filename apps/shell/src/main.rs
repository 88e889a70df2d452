//! # Storefront Shell
//!
//! Command-line front-end for the storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Storefront Shell                               │
//! │                                                                         │
//! │  argv ──► clap ──► commands::run ──► StorefrontService ──► HttpBackend │
//! │                          │                                    │         │
//! │                          ▼                                    ▼         │
//! │                    SearchDispatcher                     REST backend    │
//! │                                                                         │
//! │  Logs go to stderr (RUST_LOG), results to stdout.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use storefront_client::ClientError;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("error: {}", err);
            if err
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::is_auth_error)
            {
                eprintln!("hint: run `storefront login <username> --password <password>`");
            }
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_client=trace` - Trace the client crate only
/// - Default: warnings, plus info for the storefront crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,storefront=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

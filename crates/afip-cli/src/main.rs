//! # afip CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing; all service traffic
//! runs on a tokio runtime since the clients are async.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use afip_cli::auth::{run_auth, AuthArgs};
use afip_cli::invoice::{run_authorize, run_last, AuthorizeArgs, LastArgs};
use afip_cli::status::{run_status, StatusArgs};

/// AFIP electronic invoicing client.
///
/// Authenticates against the WSAA service with an X.509 certificate,
/// queries and authorizes domestic invoices against WSFEv1, and caches
/// access tickets between runs.
#[derive(Parser, Debug)]
#[command(name = "afip", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report the invoicing service's server status (no credentials).
    Status(StatusArgs),

    /// Obtain an access ticket and print the token/sign pair.
    Auth(AuthArgs),

    /// Query the last authorized voucher number.
    Last(LastArgs),

    /// Request a CAE for an invoice read from a JSON file.
    Authorize(AuthorizeArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Status(args) => run_status(&args).await,
        Commands::Auth(args) => run_auth(&args).await,
        Commands::Last(args) => run_last(&args).await,
        Commands::Authorize(args) => run_authorize(&args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

//! # Status Subcommand
//!
//! Connectivity probe: calls the invoicing service's `FEDummy` operation,
//! which needs no credentials, and reports the three server statuses.

use anyhow::Result;
use clap::Args;

use afip_ws::wsfe::{self, WsfeClient};
use url::Url;

/// Arguments for the `afip status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Use the production endpoint instead of homologation.
    #[arg(long)]
    pub production: bool,
}

/// Run `afip status`.
pub async fn run_status(args: &StatusArgs) -> Result<u8> {
    let raw = if args.production {
        wsfe::PRODUCTION_ENDPOINT
    } else {
        wsfe::TESTING_ENDPOINT
    };
    let endpoint = Url::parse(raw)?;
    println!("Servicio: {endpoint}");

    let status = WsfeClient::server_status_at(endpoint).await?;
    println!("AppServer:  {}", status.app_server);
    println!("DbServer:   {}", status.db_server);
    println!("AuthServer: {}", status.auth_server);

    Ok(if status.all_ok() { 0 } else { 1 })
}

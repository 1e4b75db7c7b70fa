//! # Auth Subcommand
//!
//! Obtains an access ticket (reusing the cache when valid) and prints
//! the credential pair. `--inspect` additionally reports the emitter
//! certificate's subject, issuer and expiry, which is the usual first
//! check when a login starts failing.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use afip_crypto::certificate::inspect_certificate;

use crate::common::ConnectionArgs;

/// Arguments for the `afip auth` subcommand.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Also print the emitter certificate's subject, issuer and expiry.
    #[arg(long)]
    pub inspect: bool,
}

/// Run `afip auth`.
pub async fn run_auth(args: &AuthArgs) -> Result<u8> {
    if args.inspect {
        let info = inspect_certificate(&args.connection.cert)
            .context("could not inspect the emitter certificate")?;
        println!("Subject:   {}", info.subject);
        println!("Issuer:    {}", info.issuer);
        println!("NotAfter:  {}", info.not_after);
        if info.is_expired(Utc::now()) {
            println!("El certificado está VENCIDO; renovarlo antes de autenticar.");
            return Ok(1);
        }
    }

    let ticket = args.connection.obtain_ticket().await?;
    println!("Expira:    {}", ticket.expiration_time);
    println!("Token:     {}", ticket.token);
    println!("Sign:      {}", ticket.sign);
    Ok(0)
}

//! Shared connection arguments and client construction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use url::Url;

use afip_core::Cuit;
use afip_crypto::{Credentials, OpensslSmimeSigner};
use afip_ws::{wsaa, wsfe, AccessTicket, TicketStore, WsaaClient, WsfeClient};

/// Requested ticket lifetime when logging in.
const TICKET_TTL_SECS: i64 = afip_crypto::tra::DEFAULT_TTL_SECS;

/// Connection settings shared by every subcommand that talks to the
/// services.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Emitter certificate (PEM) issued by the tax authority.
    #[arg(long, value_name = "FILE")]
    pub cert: PathBuf,

    /// Private key (PEM) matching the certificate.
    #[arg(long, value_name = "FILE")]
    pub key: PathBuf,

    /// Passphrase protecting the private key, if any.
    #[arg(long)]
    pub passphrase: Option<String>,

    /// Emitter CUIT (11 digits, hyphens accepted).
    #[arg(long)]
    pub cuit: String,

    /// Use the production endpoints instead of homologation.
    #[arg(long)]
    pub production: bool,

    /// Directory for the access ticket cache.
    #[arg(long, value_name = "DIR", default_value = "cache")]
    pub cache: PathBuf,

    /// Service name to request the access ticket for.
    #[arg(long, default_value = "wsfe")]
    pub service: String,
}

impl ConnectionArgs {
    /// Authentication service endpoint for the selected environment.
    pub fn wsaa_endpoint(&self) -> Result<Url> {
        let raw = if self.production {
            wsaa::PRODUCTION_ENDPOINT
        } else {
            wsaa::TESTING_ENDPOINT
        };
        Url::parse(raw).context("invalid WSAA endpoint")
    }

    /// Invoicing service endpoint for the selected environment.
    pub fn wsfe_endpoint(&self) -> Result<Url> {
        let raw = if self.production {
            wsfe::PRODUCTION_ENDPOINT
        } else {
            wsfe::TESTING_ENDPOINT
        };
        Url::parse(raw).context("invalid WSFEv1 endpoint")
    }

    /// The emitter CUIT, validated.
    pub fn cuit(&self) -> Result<Cuit> {
        Cuit::new(self.cuit.as_str()).context("invalid --cuit")
    }

    /// Signing credentials from the certificate/key arguments.
    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(&self.cert, &self.key);
        match &self.passphrase {
            Some(pass) => credentials.with_passphrase(pass.clone()),
            None => credentials,
        }
    }

    /// Obtain an access ticket, reusing the on-disk cache when a valid
    /// one is present.
    pub async fn obtain_ticket(&self) -> Result<AccessTicket> {
        let credentials = self.credentials();
        let signer = OpensslSmimeSigner::new(credentials.clone());
        let client = WsaaClient::new(self.wsaa_endpoint()?)?;
        let store = TicketStore::new(&self.cache);
        let ticket = store
            .obtain(&client, &signer, &self.service, TICKET_TTL_SECS, &credentials)
            .await
            .context("could not obtain access ticket")?;
        Ok(ticket)
    }

    /// A ready invoicing client: cached-or-fresh ticket plus CUIT.
    pub async fn wsfe_client(&self) -> Result<WsfeClient> {
        let ticket = self.obtain_ticket().await?;
        let client = WsfeClient::new(self.wsfe_endpoint()?, ticket, self.cuit()?)?;
        Ok(client)
    }
}

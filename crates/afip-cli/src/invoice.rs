//! # Voucher Numbering and Authorization Subcommands
//!
//! `afip last` queries the last authorized voucher number for a voucher
//! type at a point of sale. `afip authorize` reads an invoice from a
//! JSON file, numbers it right after the last authorized voucher when
//! the file leaves the number at zero, and requests a CAE — the same
//! sequence the reference workflow performs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use afip_core::{PointOfSale, VoucherType};
use afip_ws::wsfe::AuthorizationResult;
use afip_ws::{Invoice, WsfeError};

use crate::common::ConnectionArgs;

/// Code the service reports when the voucher number was already
/// authorized (typically a resubmission after a lost response).
const ALREADY_AUTHORIZED: i64 = 10016;

/// Arguments for the `afip last` subcommand.
#[derive(Args, Debug)]
pub struct LastArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Voucher type code (e.g. 6 = Factura B).
    #[arg(long, value_name = "CODE")]
    pub voucher_type: u16,

    /// Point of sale number.
    #[arg(long, value_name = "POS")]
    pub pos: u32,
}

/// Run `afip last`.
pub async fn run_last(args: &LastArgs) -> Result<u8> {
    let voucher_type = VoucherType(args.voucher_type);
    let pos = PointOfSale::new(args.pos).context("invalid --pos")?;

    let client = args.connection.wsfe_client().await?;
    let last = client.last_authorized(voucher_type, pos).await?;
    println!("{voucher_type} en punto de venta {pos}: último autorizado {last}");
    Ok(0)
}

/// Arguments for the `afip authorize` subcommand.
#[derive(Args, Debug)]
pub struct AuthorizeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Invoice JSON file (see the `Invoice` record for the field names).
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,
}

/// Run `afip authorize`.
pub async fn run_authorize(args: &AuthorizeArgs) -> Result<u8> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("could not read {}", args.file.display()))?;
    let mut invoice: Invoice =
        serde_json::from_str(&raw).context("invalid invoice JSON")?;

    let client = args.connection.wsfe_client().await?;

    // Number the voucher right after the last authorized one unless the
    // file pinned a number explicitly.
    if invoice.number_from == 0 {
        let last = client
            .last_authorized(invoice.voucher_type, invoice.point_of_sale)
            .await?;
        invoice.number_from = last + 1;
        invoice.number_to = last + 1;
        tracing::info!(number = last + 1, "voucher numbered after last authorized");
    }

    let outcome = client.authorize(&invoice).await;
    let authorization = match outcome {
        Err(ref err @ WsfeError::Service { .. }) if err.has_code(ALREADY_AUTHORIZED) => {
            // The number was consumed by an earlier request whose
            // response never arrived; the recorded voucher is retrievable.
            println!(
                "El comprobante {} ya fue autorizado; recuperándolo del servicio…",
                invoice.number_to
            );
            let info = client
                .get_voucher(invoice.voucher_type, invoice.point_of_sale, invoice.number_to)
                .await?;
            match info.authorization_code {
                Some(cae) => {
                    println!("CAE {cae} (emitido previamente)");
                    if let Some(due) = info.due_date {
                        println!("Vencimiento CAE: {due}");
                    }
                    return Ok(0);
                }
                None => {
                    println!("El servicio no informó código de autorización.");
                    return Ok(1);
                }
            }
        }
        other => other?,
    };

    for event in &authorization.events {
        println!("Evento {event}");
    }

    match authorization.result {
        AuthorizationResult::Approved => {
            // CAE always accompanies an approval.
            let cae = authorization.cae.as_deref().unwrap_or("<sin CAE>");
            println!(
                "Comprobante {} aprobado, CAE {cae}",
                authorization.voucher_number
            );
            if let Some(due) = authorization.cae_due_date {
                println!("Vencimiento CAE: {due}");
            }
            Ok(0)
        }
        result => {
            println!(
                "Comprobante {} {result}",
                authorization.voucher_number
            );
            for obs in &authorization.observations {
                println!("Observación {obs}");
            }
            Ok(1)
        }
    }
}

//! # afip-core
//!
//! Foundational types shared by the AFIP electronic invoicing client stack.
//!
//! This crate carries no I/O and no transport logic. It defines:
//!
//! - Identifier newtypes validated at construction ([`Cuit`],
//!   [`PointOfSale`]) — you cannot pass an arbitrary string where a
//!   taxpayer identifier is expected.
//! - The numeric code tables AFIP uses on the wire ([`VoucherType`],
//!   [`DocumentType`], [`Concept`], [`VatRate`]).
//! - Compact `YYYYMMDD` wire-date conversion ([`dates`]).
//! - Minimal XML text utilities ([`xml`]) used by the request builders and
//!   response scrapers in the sibling crates.

pub mod dates;
pub mod error;
pub mod identity;
pub mod voucher;
pub mod xml;

pub use error::ValidationError;
pub use identity::{Cuit, PointOfSale};
pub use voucher::{Concept, DocumentType, VatRate, VoucherType};

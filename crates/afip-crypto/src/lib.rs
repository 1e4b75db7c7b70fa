//! # afip-crypto — Access-Ticket Signing for the AFIP Client Stack
//!
//! This crate produces the signed payload the authentication service
//! (WSAA) requires:
//!
//! - **TRA construction** ([`TicketRequest`]): the `loginTicketRequest`
//!   XML document naming the target service and the validity window.
//! - **CMS signing** ([`CmsSigner`]): PKCS#7/CMS SignedData over the TRA,
//!   base64-encoded, behind a pluggable signer trait. The production
//!   backend ([`OpensslSmimeSigner`]) drives the `openssl smime` CLI with
//!   the emitter's X.509 certificate and private key; a deterministic
//!   in-memory backend ([`StaticCmsSigner`]) supports tests and
//!   development against mock endpoints.
//! - **Certificate inspection** ([`certificate::inspect_certificate`]):
//!   subject, issuer and expiry of the emitter certificate, for
//!   diagnostics before a login attempt fails remotely.

pub mod certificate;
pub mod error;
pub mod signer;
pub mod tra;

pub use certificate::CertificateInfo;
pub use error::CryptoError;
pub use signer::{Cms, CmsSigner, Credentials, OpensslSmimeSigner, StaticCmsSigner};
pub use tra::TicketRequest;

//! Emitter certificate inspection.
//!
//! Reads the subject, issuer and expiry of the X.509 PEM certificate via
//! `openssl x509 -noout`, so a stale or mismatched credential is reported
//! locally instead of as an opaque remote login failure.

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::CryptoError;
use crate::signer::OPENSSL_PROGRAM;

/// Fields extracted from an emitter certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Distinguished name of the certificate holder.
    pub subject: String,
    /// Distinguished name of the issuing authority.
    pub issuer: String,
    /// Expiry instant (`notAfter`).
    pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
    /// Whether the certificate has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.not_after
    }
}

/// Inspect a PEM certificate with the default `openssl` program.
pub fn inspect_certificate(certificate: &Path) -> Result<CertificateInfo, CryptoError> {
    inspect_certificate_with(certificate, OPENSSL_PROGRAM)
}

/// Inspect a PEM certificate with an explicit OpenSSL program path.
pub fn inspect_certificate_with(
    certificate: &Path,
    program: &str,
) -> Result<CertificateInfo, CryptoError> {
    if std::fs::metadata(certificate).is_err() {
        return Err(CryptoError::CredentialNotReadable {
            path: certificate.to_path_buf(),
        });
    }

    let output = Command::new(program)
        .arg("x509")
        .arg("-in")
        .arg(certificate)
        .arg("-noout")
        .arg("-subject")
        .arg("-issuer")
        .arg("-enddate")
        .output()
        .map_err(|source| CryptoError::ToolUnavailable {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(CryptoError::ToolFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_x509_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the three `key=value` lines `openssl x509 -noout` prints.
fn parse_x509_output(stdout: &str) -> Result<CertificateInfo, CryptoError> {
    let mut subject = None;
    let mut issuer = None;
    let mut not_after = None;
    for line in stdout.lines() {
        if let Some(v) = line.strip_prefix("subject=") {
            subject = Some(v.trim().to_string());
        } else if let Some(v) = line.strip_prefix("issuer=") {
            issuer = Some(v.trim().to_string());
        } else if let Some(v) = line.strip_prefix("notAfter=") {
            not_after = Some(parse_openssl_time(v.trim())?);
        }
    }
    match (subject, issuer, not_after) {
        (Some(subject), Some(issuer), Some(not_after)) => Ok(CertificateInfo {
            subject,
            issuer,
            not_after,
        }),
        _ => Err(CryptoError::MalformedOutput(format!(
            "missing subject/issuer/notAfter in: {stdout:?}"
        ))),
    }
}

/// Parse OpenSSL's `notAfter` format, e.g. `May 21 23:59:59 2026 GMT`.
fn parse_openssl_time(value: &str) -> Result<DateTime<Utc>, CryptoError> {
    let trimmed = value.trim_end_matches(" GMT");
    NaiveDateTime::parse_from_str(trimmed, "%b %e %H:%M:%S %Y")
        .map(|naive| naive.and_utc())
        .map_err(|_| CryptoError::MalformedOutput(format!("unparseable notAfter: {value:?}")))
}

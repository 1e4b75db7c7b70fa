//! # On-Disk Access Ticket Cache
//!
//! The authentication service refuses a new login while a previously
//! granted ticket for the same (service, emitter) pair is still valid,
//! so tickets must survive process restarts. This store writes each
//! granted ticket document to `TA-<key>.xml` under a cache directory,
//! keyed by a SHA-256 over the service name and the credential paths —
//! distinct emitters or services never collide on the same cache file.
//!
//! A cache entry that is missing, unparseable or expired is simply a
//! miss: the caller logs in again and overwrites it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};

use afip_crypto::{CmsSigner, Credentials};

use crate::wsaa::{AccessTicket, WsaaClient, WsaaError};

/// File-backed access ticket cache.
#[derive(Debug, Clone)]
pub struct TicketStore {
    dir: PathBuf,
}

impl TicketStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache file path for a (service, credentials) pair.
    pub fn entry_path(&self, service: &str, credentials: &Credentials) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(service.as_bytes());
        hasher.update(credentials.certificate.as_os_str().as_encoded_bytes());
        hasher.update(credentials.private_key.as_os_str().as_encoded_bytes());
        let digest = hasher.finalize();
        let key: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("TA-{key}.xml"))
    }

    /// Load the cached ticket if present and still usable.
    pub fn load(&self, service: &str, credentials: &Credentials) -> Option<AccessTicket> {
        let path = self.entry_path(service, credentials);
        let raw = std::fs::read_to_string(&path).ok()?;
        match AccessTicket::parse(&raw) {
            Ok(ticket) if !ticket.is_expired(Utc::now()) => {
                tracing::debug!(path = %path.display(), "reusing cached access ticket");
                Some(ticket)
            }
            Ok(_) => {
                tracing::debug!(path = %path.display(), "cached access ticket expired");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "discarding unreadable ticket cache: {e}");
                None
            }
        }
    }

    /// Persist a granted ticket.
    pub fn save(
        &self,
        service: &str,
        credentials: &Credentials,
        ticket: &AccessTicket,
    ) -> Result<(), WsaaError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(service, credentials);
        std::fs::write(&path, &ticket.xml)?;
        tracing::debug!(path = %path.display(), "access ticket cached");
        Ok(())
    }

    /// Cached-or-fresh ticket: reuse a valid cache entry, otherwise run
    /// the full authentication flow through `client` and cache the
    /// result.
    pub async fn obtain(
        &self,
        client: &WsaaClient,
        signer: &dyn CmsSigner,
        service: &str,
        ttl_secs: i64,
        credentials: &Credentials,
    ) -> Result<AccessTicket, WsaaError> {
        if let Some(ticket) = self.load(service, credentials) {
            return Ok(ticket);
        }
        let ticket = client.authenticate(signer, service, ttl_secs).await?;
        self.save(service, credentials, &ticket)?;
        Ok(ticket)
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//! # WSAA — Authentication and Authorization Service Client
//!
//! Exchanges a CMS-signed access ticket request (TRA) for an access
//! ticket. The ticket is a token/signature pair plus a validity window;
//! every WSFEv1 call carries it alongside the emitter's CUIT.
//!
//! The service grants one ticket per (service, emitter) at a time and
//! rejects a new login while the previous ticket is still valid, so
//! callers are expected to hold on to tickets — see
//! [`crate::TicketStore`] for the on-disk cache.

use chrono::{DateTime, Duration, Utc};
use url::Url;

use afip_core::xml;
use afip_crypto::{Cms, CmsSigner, CryptoError, TicketRequest};

use crate::soap::{envelope, SoapClient, SoapError};

/// Homologation (testing) endpoint.
pub const TESTING_ENDPOINT: &str = "https://wsaahomo.afip.gov.ar/ws/services/LoginCms";
/// Production endpoint.
pub const PRODUCTION_ENDPOINT: &str = "https://wsaa.afip.gov.ar/ws/services/LoginCms";

/// Service namespace declared on the login envelope.
const SERVICE_NS: &str = "http://wsaa.view.sua.dvadac.desein.afip.gov";
/// SOAPAction for `loginCms`.
const LOGIN_ACTION: &str = "http://ar.gov.afip.dif.facturaelectronica/loginCms";

/// Safety margin subtracted from the ticket's expiration when deciding
/// whether it is still usable: a ticket about to lapse mid-request is
/// treated as already expired.
const EXPIRY_MARGIN_SECS: i64 = 120;

/// Errors from authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum WsaaError {
    /// Transport or protocol failure.
    #[error(transparent)]
    Soap(#[from] SoapError),

    /// TRA signing failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The service answered but the ticket document was not in the
    /// expected shape.
    #[error("malformed access ticket: {detail}")]
    MalformedTicket {
        /// What was missing or unparseable.
        detail: String,
    },

    /// Ticket cache I/O failure.
    #[error("ticket cache error: {0}")]
    Cache(#[from] std::io::Error),
}

// ─── AccessTicket ────────────────────────────────────────────────────────

/// An access ticket granted by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTicket {
    /// Opaque credential token.
    pub token: String,
    /// Signature over the token.
    pub sign: String,
    /// Instant after which the ticket is no longer accepted.
    pub expiration_time: DateTime<Utc>,
    /// The full `loginTicketResponse` document as received, kept for
    /// on-disk caching.
    pub xml: String,
}

impl AccessTicket {
    /// Parse a `loginTicketResponse` document.
    ///
    /// # Errors
    ///
    /// Returns [`WsaaError::MalformedTicket`] when `credentials/token`,
    /// `credentials/sign` or `header/expirationTime` is missing or the
    /// expiration is not a valid timestamp.
    pub fn parse(ta_xml: &str) -> Result<Self, WsaaError> {
        let field = |tag: &str| {
            xml::tag_text(ta_xml, tag)
                .map(|v| xml::unescape(v.trim()))
                .filter(|v| !v.is_empty())
                .ok_or_else(|| WsaaError::MalformedTicket {
                    detail: format!("missing <{tag}>"),
                })
        };
        let token = field("token")?;
        let sign = field("sign")?;
        let raw_expiration = field("expirationTime")?;
        let expiration_time = DateTime::parse_from_rfc3339(&raw_expiration)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| WsaaError::MalformedTicket {
                detail: format!("unparseable expirationTime {raw_expiration:?}"),
            })?;
        Ok(Self {
            token,
            sign,
            expiration_time,
            xml: ta_xml.to_string(),
        })
    }

    /// Whether the ticket is expired (or about to expire) as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expiration_time
    }
}

// ─── WsaaClient ──────────────────────────────────────────────────────────

/// Client for the authentication service.
#[derive(Debug, Clone)]
pub struct WsaaClient {
    soap: SoapClient,
}

impl WsaaClient {
    /// Client against an explicit endpoint (see [`TESTING_ENDPOINT`] and
    /// [`PRODUCTION_ENDPOINT`]).
    pub fn new(endpoint: Url) -> Result<Self, WsaaError> {
        Ok(Self {
            soap: SoapClient::new(endpoint)?,
        })
    }

    /// Submit a signed CMS and return the granted access ticket.
    pub async fn login_cms(&self, cms: &Cms) -> Result<AccessTicket, WsaaError> {
        let body = format!(
            "<ar:loginCms><ar:in0>{}</ar:in0></ar:loginCms>",
            cms.as_str()
        );
        let response = self
            .soap
            .call(LOGIN_ACTION, envelope(SERVICE_NS, &body))
            .await?;

        // The ticket document travels XML-escaped inside loginCmsReturn.
        let escaped =
            xml::tag_text(&response, "loginCmsReturn").ok_or(WsaaError::MalformedTicket {
                detail: "missing <loginCmsReturn>".into(),
            })?;
        let ticket = AccessTicket::parse(&xml::unescape(escaped))?;
        tracing::info!(
            expiration = %ticket.expiration_time,
            "access ticket granted"
        );
        Ok(ticket)
    }

    /// Full authentication flow: build a TRA for `service`, sign it with
    /// `signer`, and exchange it for an access ticket.
    pub async fn authenticate(
        &self,
        signer: &dyn CmsSigner,
        service: &str,
        ttl_secs: i64,
    ) -> Result<AccessTicket, WsaaError> {
        let tra = TicketRequest::new(service, ttl_secs);
        tracing::debug!(service, signer = signer.signer_name(), "signing TRA");
        let cms = signer.sign(&tra.to_xml())?;
        self.login_cms(&cms).await
    }
}

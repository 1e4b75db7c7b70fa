//! # SOAP 1.1 Transport
//!
//! Shared request-response plumbing for both AFIP services: envelope
//! construction, `text/xml` POST with the `SOAPAction` header, retry of
//! transient transport failures, and SOAP Fault extraction. The endpoint
//! URL is captured in every error so a misconfigured environment
//! (testing vs. production) is visible in the diagnostic, not just in
//! the behavior.

use std::time::Duration;

use url::Url;

use afip_core::xml;

use crate::retry::RetryPolicy;

/// Default per-request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors from the SOAP transport layer.
#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    /// Failed to construct the underlying HTTP client.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    /// HTTP transport error after retries were exhausted.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// Endpoint URL the request was sent to.
        endpoint: String,
        /// The underlying transport error.
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status and no SOAP fault.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint URL the request was sent to.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// The service answered with a SOAP Fault.
    #[error("SOAP fault from {endpoint}: {code}: {message}")]
    Fault {
        /// Endpoint URL the request was sent to.
        endpoint: String,
        /// `faultcode` reported by the service.
        code: String,
        /// `faultstring` reported by the service.
        message: String,
    },
}

/// SOAP 1.1 client bound to one service endpoint.
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl SoapClient {
    /// Client for `endpoint` with the default timeout and retry policy.
    pub fn new(endpoint: Url) -> Result<Self, SoapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(SoapError::Client)?;
        Ok(Self {
            http,
            endpoint,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy (e.g. [`RetryPolicy::none`] for calls
    /// that must not be resubmitted).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST a SOAP envelope and return the response body XML.
    ///
    /// The body is returned as-is on 2xx; a SOAP Fault (any status) maps
    /// to [`SoapError::Fault`]; any other non-2xx maps to
    /// [`SoapError::Status`].
    pub async fn call(&self, action: &str, envelope: String) -> Result<String, SoapError> {
        let endpoint = self.endpoint.to_string();
        tracing::debug!(%endpoint, %action, bytes = envelope.len(), "SOAP request");

        let resp = self
            .retry
            .send(|| {
                self.http
                    .post(self.endpoint.clone())
                    .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
                    .header("SOAPAction", format!("\"{action}\""))
                    .body(envelope.clone())
                    .send()
            })
            .await
            .map_err(|source| SoapError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| SoapError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;

        // Faults arrive with status 500 from both services; scan for the
        // fault element before judging the status code.
        if let Some((code, message)) = extract_fault(&body) {
            return Err(SoapError::Fault {
                endpoint,
                code,
                message,
            });
        }
        if !status.is_success() {
            return Err(SoapError::Status {
                endpoint,
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        tracing::debug!(%endpoint, status = status.as_u16(), bytes = body.len(), "SOAP response");
        Ok(body)
    }
}

/// Wrap a body fragment in a SOAP 1.1 envelope declaring the service
/// namespace under the `ar` prefix.
pub fn envelope(service_ns: &str, body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ar="{ns}">"#,
            "<soapenv:Header/>",
            "<soapenv:Body>{body}</soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        ns = service_ns,
        body = body,
    )
}

/// Extract (`faultcode`, `faultstring`) if the body carries a SOAP Fault.
fn extract_fault(body: &str) -> Option<(String, String)> {
    // Prefix-agnostic: axis answers soapenv:Fault, asmx answers soap:Fault.
    if !body.contains(":Fault") && !body.contains("<Fault") {
        return None;
    }
    let code = xml::tag_text(body, "faultcode").unwrap_or("").trim();
    let message = xml::tag_text(body, "faultstring").unwrap_or("").trim();
    if code.is_empty() && message.is_empty() {
        return None;
    }
    Some((xml::unescape(code), xml::unescape(message)))
}

/// First few hundred bytes of a body for error context.
fn excerpt(body: &str) -> String {
    const MAX: usize = 400;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

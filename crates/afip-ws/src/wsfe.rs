//! # WSFEv1 — Domestic Electronic Invoicing Client
//!
//! Typed client for the invoicing service: server status, last
//! authorized voucher number, CAE authorization requests and voucher
//! retrieval. Every operation carries the `Auth` triple (token,
//! signature, CUIT) from a previously granted access ticket.
//!
//! ## Error Model
//!
//! The service reports problems on three channels, and they are kept
//! apart deliberately:
//!
//! - **SOAP faults / transport failures** → [`SoapError`] via
//!   [`WsfeError::Soap`].
//! - **Service `Errors` arrays** (bad auth, bad sequence, duplicate
//!   number…) → [`WsfeError::Service`]. Code 10016 in these messages
//!   means the voucher number was already authorized — retrieve it with
//!   [`WsfeClient::get_voucher`] instead of resubmitting.
//! - **Detail `Observaciones`** on a rejected or partially approved
//!   request → data on the returned [`Authorization`], not an error:
//!   callers need the voucher number and result code alongside them.

use chrono::NaiveDate;
use url::Url;

use afip_core::{dates, xml, Cuit, PointOfSale, VoucherType};

use crate::invoice::{Invoice, InvoiceError};
use crate::soap::{envelope, SoapClient, SoapError};
use crate::wsaa::AccessTicket;

/// Homologation (testing) endpoint.
pub const TESTING_ENDPOINT: &str = "https://wswhomo.afip.gov.ar/wsfev1/service.asmx";
/// Production endpoint.
pub const PRODUCTION_ENDPOINT: &str = "https://servicios1.afip.gov.ar/wsfev1/service.asmx";

/// Service namespace; also the SOAPAction prefix.
const SERVICE_NS: &str = "http://ar.gov.afip.dif.FEV1/";

/// Errors from invoicing operations.
#[derive(Debug, thiserror::Error)]
pub enum WsfeError {
    /// Transport or protocol failure.
    #[error(transparent)]
    Soap(#[from] SoapError),

    /// The invoice failed local consistency validation.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// The service reported application-level errors.
    #[error("service reported: {}", format_messages(.messages))]
    Service {
        /// The `Err` entries as code/message pairs.
        messages: Vec<ServiceMessage>,
    },

    /// The response arrived but was not in the expected shape.
    #[error("malformed response: {detail}")]
    Malformed {
        /// What was missing or unparseable.
        detail: String,
    },
}

impl WsfeError {
    /// Whether the service reported the given error code.
    pub fn has_code(&self, code: i64) -> bool {
        matches!(self, Self::Service { messages } if messages.iter().any(|m| m.code == code))
    }
}

fn format_messages(messages: &[ServiceMessage]) -> String {
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A code/message pair as used by the service for errors, observations
/// and events alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    /// Numeric code from the service's error/observation tables.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for ServiceMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Outcome code of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// Approved; a CAE was granted.
    Approved,
    /// Rejected; see the observations.
    Rejected,
    /// Partially approved (multi-voucher requests).
    Partial,
}

impl AuthorizationResult {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Approved),
            "R" => Some(Self::Rejected),
            "P" => Some(Self::Partial),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthorizationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "Aprobado"),
            Self::Rejected => write!(f, "Rechazado"),
            Self::Partial => write!(f, "Parcial"),
        }
    }
}

/// Outcome of a CAE authorization request.
#[derive(Debug, Clone, PartialEq)]
pub struct Authorization {
    /// Header result code.
    pub result: AuthorizationResult,
    /// Granted CAE, present when approved.
    pub cae: Option<String>,
    /// CAE expiry date.
    pub cae_due_date: Option<NaiveDate>,
    /// Authorized voucher number (last of the range).
    pub voucher_number: u64,
    /// Detail observations (rejection reasons, advisories).
    pub observations: Vec<ServiceMessage>,
    /// Service events (maintenance windows, announcements).
    pub events: Vec<ServiceMessage>,
}

/// Status of the service's application, database and authentication
/// servers, as reported by `FEDummy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    /// Application server status (`OK` when healthy).
    pub app_server: String,
    /// Database server status.
    pub db_server: String,
    /// Authentication server status.
    pub auth_server: String,
}

impl ServerStatus {
    /// Whether all three servers report `OK`.
    pub fn all_ok(&self) -> bool {
        [&self.app_server, &self.db_server, &self.auth_server]
            .iter()
            .all(|s| s.eq_ignore_ascii_case("OK"))
    }
}

/// An already-authorized voucher as returned by `FECompConsultar`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherInfo {
    /// Authorization code (CAE or CAEA).
    pub authorization_code: Option<String>,
    /// `CAE` or `CAEA`.
    pub emission_type: Option<String>,
    /// Result code recorded for the voucher.
    pub result: Option<AuthorizationResult>,
    /// Issue date.
    pub date: Option<NaiveDate>,
    /// Authorization expiry date.
    pub due_date: Option<NaiveDate>,
    /// Grand total.
    pub total: Option<f64>,
}

// ─── WsfeClient ──────────────────────────────────────────────────────────

/// Client for the invoicing service, bound to one emitter.
#[derive(Debug, Clone)]
pub struct WsfeClient {
    soap: SoapClient,
    ticket: AccessTicket,
    cuit: Cuit,
}

impl WsfeClient {
    /// Client against an explicit endpoint (see [`TESTING_ENDPOINT`] and
    /// [`PRODUCTION_ENDPOINT`]) for the emitter identified by `cuit`.
    pub fn new(endpoint: Url, ticket: AccessTicket, cuit: Cuit) -> Result<Self, WsfeError> {
        Ok(Self {
            soap: SoapClient::new(endpoint).map_err(WsfeError::Soap)?,
            ticket,
            cuit,
        })
    }

    /// Replace the access ticket (e.g. after re-authentication).
    pub fn set_ticket(&mut self, ticket: AccessTicket) {
        self.ticket = ticket;
    }

    fn auth_xml(&self) -> String {
        format!(
            "<ar:Auth><ar:Token>{}</ar:Token><ar:Sign>{}</ar:Sign><ar:Cuit>{}</ar:Cuit></ar:Auth>",
            self.ticket.token, self.ticket.sign, self.cuit
        )
    }

    async fn call(&self, method: &str, body: String) -> Result<String, WsfeError> {
        let action = format!("{SERVICE_NS}{method}");
        Ok(self.soap.call(&action, envelope(SERVICE_NS, &body)).await?)
    }

    /// `FEDummy`: report the status of the service's servers. Needs no
    /// authentication.
    pub async fn server_status(&self) -> Result<ServerStatus, WsfeError> {
        Self::dummy_via(&self.soap).await
    }

    /// `FEDummy` without an access ticket: the only operation that can
    /// run before authentication, useful as a connectivity probe.
    pub async fn server_status_at(endpoint: Url) -> Result<ServerStatus, WsfeError> {
        let soap = SoapClient::new(endpoint)?;
        Self::dummy_via(&soap).await
    }

    async fn dummy_via(soap: &SoapClient) -> Result<ServerStatus, WsfeError> {
        let action = format!("{SERVICE_NS}FEDummy");
        let response = soap
            .call(&action, envelope(SERVICE_NS, "<ar:FEDummy/>"))
            .await?;
        let result = required_block(&response, "FEDummyResult")?;
        let field = |tag| {
            xml::tag_text(result, tag)
                .map(str::trim)
                .unwrap_or("")
                .to_string()
        };
        Ok(ServerStatus {
            app_server: field("AppServer"),
            db_server: field("DbServer"),
            auth_server: field("AuthServer"),
        })
    }

    /// `FECompUltimoAutorizado`: last authorized voucher number for a
    /// voucher type at a point of sale. Returns 0 when none was ever
    /// authorized.
    pub async fn last_authorized(
        &self,
        voucher_type: VoucherType,
        point_of_sale: PointOfSale,
    ) -> Result<u64, WsfeError> {
        let body = format!(
            "<ar:FECompUltimoAutorizado>{auth}<ar:PtoVta>{pos}</ar:PtoVta><ar:CbteTipo>{vt}</ar:CbteTipo></ar:FECompUltimoAutorizado>",
            auth = self.auth_xml(),
            pos = point_of_sale.value(),
            vt = voucher_type.code(),
        );
        let response = self.call("FECompUltimoAutorizado", body).await?;
        let result = required_block(&response, "FECompUltimoAutorizadoResult")?;
        fail_on_service_errors(result)?;
        let number = xml::tag_text(result, "CbteNro").ok_or(WsfeError::Malformed {
            detail: "missing <CbteNro>".into(),
        })?;
        number.trim().parse().map_err(|_| WsfeError::Malformed {
            detail: format!("unparseable <CbteNro> {number:?}"),
        })
    }

    /// `FECAESolicitar`: request a CAE for one invoice.
    ///
    /// The invoice is validated locally first; a request that the
    /// service is guaranteed to reject never leaves the process.
    pub async fn authorize(&self, invoice: &Invoice) -> Result<Authorization, WsfeError> {
        invoice.validate()?;
        let body = format!(
            concat!(
                "<ar:FECAESolicitar>{auth}",
                "<ar:FeCAEReq>",
                "<ar:FeCabReq>",
                "<ar:CantReg>1</ar:CantReg>",
                "<ar:PtoVta>{pos}</ar:PtoVta>",
                "<ar:CbteTipo>{vt}</ar:CbteTipo>",
                "</ar:FeCabReq>",
                "<ar:FeDetReq><ar:FECAEDetRequest>{detail}</ar:FECAEDetRequest></ar:FeDetReq>",
                "</ar:FeCAEReq>",
                "</ar:FECAESolicitar>"
            ),
            auth = self.auth_xml(),
            pos = invoice.point_of_sale.value(),
            vt = invoice.voucher_type.code(),
            detail = detail_xml(invoice),
        );
        tracing::info!(
            voucher_type = invoice.voucher_type.code(),
            point_of_sale = invoice.point_of_sale.value(),
            number = invoice.number_to,
            "requesting CAE"
        );
        let response = self.call("FECAESolicitar", body).await?;
        parse_authorization(&response)
    }

    /// `FECompConsultar`: retrieve an already-authorized voucher.
    pub async fn get_voucher(
        &self,
        voucher_type: VoucherType,
        point_of_sale: PointOfSale,
        number: u64,
    ) -> Result<VoucherInfo, WsfeError> {
        let body = format!(
            concat!(
                "<ar:FECompConsultar>{auth}",
                "<ar:FeCompConsReq>",
                "<ar:CbteTipo>{vt}</ar:CbteTipo>",
                "<ar:CbteNro>{number}</ar:CbteNro>",
                "<ar:PtoVta>{pos}</ar:PtoVta>",
                "</ar:FeCompConsReq>",
                "</ar:FECompConsultar>"
            ),
            auth = self.auth_xml(),
            vt = voucher_type.code(),
            number = number,
            pos = point_of_sale.value(),
        );
        let response = self.call("FECompConsultar", body).await?;
        let result = required_block(&response, "FECompConsultarResult")?;
        fail_on_service_errors(result)?;
        let get = required_block(result, "ResultGet")?;
        let text = |tag: &str| {
            xml::tag_text(get, tag)
                .map(|v| xml::unescape(v.trim()))
                .filter(|v| !v.is_empty())
        };
        Ok(VoucherInfo {
            authorization_code: text("CodAutorizacion"),
            emission_type: text("EmisionTipo"),
            result: text("Resultado").and_then(|c| AuthorizationResult::from_code(&c)),
            date: text("CbteFch").and_then(|d| dates::from_compact(&d).ok()),
            due_date: text("FchVto").and_then(|d| dates::from_compact(&d).ok()),
            total: text("ImpTotal").and_then(|v| v.parse().ok()),
        })
    }
}

// ─── Request construction ────────────────────────────────────────────────

fn amount(value: f64) -> String {
    format!("{value:.2}")
}

/// The `FECAEDetRequest` children, in the order the service's schema
/// requires. Optional elements are omitted entirely when absent, as the
/// service distinguishes absent from empty.
fn detail_xml(invoice: &Invoice) -> String {
    let mut det = String::with_capacity(1024);
    let mut push = |tag: &str, value: String| {
        det.push_str(&format!("<ar:{tag}>{value}</ar:{tag}>"));
    };

    push("Concepto", invoice.concept.code().to_string());
    push("DocTipo", invoice.document_type.code().to_string());
    push("DocNro", invoice.document_number.to_string());
    push("CbteDesde", invoice.number_from.to_string());
    push("CbteHasta", invoice.number_to.to_string());
    push("CbteFch", dates::to_compact(invoice.date));
    push("ImpTotal", amount(invoice.total));
    push("ImpTotConc", amount(invoice.untaxed_net));
    push("ImpNeto", amount(invoice.net));
    push("ImpOpEx", amount(invoice.exempt));
    push("ImpTrib", amount(invoice.tax_total));
    push("ImpIVA", amount(invoice.vat_total));
    if let Some(d) = invoice.service_from {
        push("FchServDesde", dates::to_compact(d));
    }
    if let Some(d) = invoice.service_to {
        push("FchServHasta", dates::to_compact(d));
    }
    if let Some(d) = invoice.payment_due {
        push("FchVtoPago", dates::to_compact(d));
    }
    push("MonId", xml::escape(&invoice.currency));
    push("MonCotiz", format!("{:.4}", invoice.fx_rate));

    if !invoice.associated.is_empty() {
        let mut block = String::new();
        for assoc in &invoice.associated {
            block.push_str("<ar:CbteAsoc>");
            block.push_str(&format!("<ar:Tipo>{}</ar:Tipo>", assoc.voucher_type.code()));
            block.push_str(&format!("<ar:PtoVta>{}</ar:PtoVta>", assoc.point_of_sale.value()));
            block.push_str(&format!("<ar:Nro>{}</ar:Nro>", assoc.number));
            if let Some(cuit) = &assoc.cuit {
                block.push_str(&format!("<ar:Cuit>{cuit}</ar:Cuit>"));
            }
            if let Some(date) = assoc.date {
                block.push_str(&format!("<ar:CbteFch>{}</ar:CbteFch>", dates::to_compact(date)));
            }
            block.push_str("</ar:CbteAsoc>");
        }
        push("CbtesAsoc", block);
    }

    if !invoice.taxes.is_empty() {
        let mut block = String::new();
        for tax in &invoice.taxes {
            block.push_str("<ar:Tributo>");
            block.push_str(&format!("<ar:Id>{}</ar:Id>", tax.code));
            block.push_str(&format!("<ar:Desc>{}</ar:Desc>", xml::escape(&tax.description)));
            block.push_str(&format!("<ar:BaseImp>{}</ar:BaseImp>", amount(tax.base)));
            block.push_str(&format!("<ar:Alic>{:.2}</ar:Alic>", tax.rate));
            block.push_str(&format!("<ar:Importe>{}</ar:Importe>", amount(tax.amount)));
            block.push_str("</ar:Tributo>");
        }
        push("Tributos", block);
    }

    if !invoice.vat.is_empty() {
        let mut block = String::new();
        for line in &invoice.vat {
            block.push_str("<ar:AlicIva>");
            block.push_str(&format!("<ar:Id>{}</ar:Id>", line.rate.code()));
            block.push_str(&format!("<ar:BaseImp>{}</ar:BaseImp>", amount(line.base)));
            block.push_str(&format!("<ar:Importe>{}</ar:Importe>", amount(line.amount)));
            block.push_str("</ar:AlicIva>");
        }
        push("Iva", block);
    }

    if !invoice.optionals.is_empty() {
        let mut block = String::new();
        for opt in &invoice.optionals {
            block.push_str("<ar:Opcional>");
            block.push_str(&format!("<ar:Id>{}</ar:Id>", xml::escape(&opt.id)));
            block.push_str(&format!("<ar:Valor>{}</ar:Valor>", xml::escape(&opt.value)));
            block.push_str("</ar:Opcional>");
        }
        push("Opcionales", block);
    }

    det
}

// ─── Response scraping ───────────────────────────────────────────────────

fn required_block<'a>(xml_body: &'a str, tag: &str) -> Result<&'a str, WsfeError> {
    xml::tag_text(xml_body, tag).ok_or_else(|| WsfeError::Malformed {
        detail: format!("missing <{tag}>"),
    })
}

/// Collect the code/message pairs inside each `wrapper` entry (`Err`,
/// `Obs` or `Evt` blocks share the shape).
fn collect_messages(block: &str, entry: &str) -> Vec<ServiceMessage> {
    xml::tag_blocks(block, entry)
        .into_iter()
        .filter_map(|b| {
            let code = xml::tag_text(b, "Code")?.trim().parse().ok()?;
            let message = xml::unescape(xml::tag_text(b, "Msg").unwrap_or("").trim());
            Some(ServiceMessage { code, message })
        })
        .collect()
}

/// Surface a non-empty `Errors` array as [`WsfeError::Service`].
fn fail_on_service_errors(result_block: &str) -> Result<(), WsfeError> {
    let messages = match xml::tag_text(result_block, "Errors") {
        Some(errors) => collect_messages(errors, "Err"),
        None => return Ok(()),
    };
    if messages.is_empty() {
        Ok(())
    } else {
        Err(WsfeError::Service { messages })
    }
}

fn parse_authorization(response: &str) -> Result<Authorization, WsfeError> {
    let result = required_block(response, "FECAESolicitarResult")?;

    // An auth or sequencing failure answers with Errors and no response
    // header at all.
    if xml::tag_text(result, "FeCabResp").is_none() {
        fail_on_service_errors(result)?;
        return Err(WsfeError::Malformed {
            detail: "missing <FeCabResp>".into(),
        });
    }
    fail_on_service_errors(result)?;

    let cab = required_block(result, "FeCabResp")?;
    let det = xml::tag_blocks(result, "FECAEDetResponse")
        .into_iter()
        .next()
        .ok_or_else(|| WsfeError::Malformed {
            detail: "missing <FECAEDetResponse>".into(),
        })?;

    let header_result = xml::tag_text(cab, "Resultado")
        .map(str::trim)
        .unwrap_or_default();
    let result_code =
        AuthorizationResult::from_code(header_result).ok_or_else(|| WsfeError::Malformed {
            detail: format!("unknown result code {header_result:?}"),
        })?;

    let cae = xml::tag_text(det, "CAE")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let cae_due_date = xml::tag_text(det, "CAEFchVto")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|d| dates::from_compact(d).ok());
    let voucher_number = xml::tag_text(det, "CbteHasta")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    let observations = match xml::tag_text(det, "Observaciones") {
        Some(obs) => collect_messages(obs, "Obs"),
        None => Vec::new(),
    };
    let events = match xml::tag_text(result, "Events") {
        Some(events) => collect_messages(events, "Evt"),
        None => Vec::new(),
    };

    Ok(Authorization {
        result: result_code,
        cae,
        cae_due_date,
        voucher_number,
        observations,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use afip_core::{Concept, DocumentType, VatRate};

    fn sample_invoice() -> Invoice {
        let mut invoice = Invoice::new(
            VoucherType::INVOICE_B,
            PointOfSale::new(4000).unwrap(),
            Concept::Products,
            NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
        )
        .numbered(13);
        invoice.document_type = DocumentType::DNI;
        invoice.document_number = 12_345_678;
        invoice.net = 100.0;
        invoice.total = 100.0;
        invoice.add_vat(VatRate::TWENTY_ONE, 100.0, 21.0);
        invoice
    }

    // -- detail_xml -----------------------------------------------------------

    #[test]
    fn detail_xml_core_fields_in_schema_order() {
        let det = detail_xml(&sample_invoice());
        let positions: Vec<usize> = [
            "<ar:Concepto>1<",
            "<ar:DocTipo>96<",
            "<ar:DocNro>12345678<",
            "<ar:CbteDesde>13<",
            "<ar:CbteHasta>13<",
            "<ar:CbteFch>20190401<",
            "<ar:ImpTotal>121.00<",
            "<ar:ImpNeto>100.00<",
            "<ar:ImpIVA>21.00<",
            "<ar:MonId>PES<",
            "<ar:MonCotiz>1.0000<",
        ]
        .iter()
        .map(|needle| det.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "fields out of order");
    }

    #[test]
    fn detail_xml_omits_absent_optionals() {
        let det = detail_xml(&sample_invoice());
        assert!(!det.contains("FchServDesde"));
        assert!(!det.contains("Tributos"));
        assert!(!det.contains("CbtesAsoc"));
        assert!(!det.contains("Opcionales"));
        assert!(det.contains("<ar:Iva>"));
    }

    #[test]
    fn detail_xml_service_period_fields() {
        let mut invoice = sample_invoice();
        invoice.concept = Concept::Services;
        invoice.service_from = NaiveDate::from_ymd_opt(2019, 3, 1);
        invoice.service_to = NaiveDate::from_ymd_opt(2019, 3, 31);
        invoice.payment_due = NaiveDate::from_ymd_opt(2019, 4, 30);
        let det = detail_xml(&invoice);
        assert!(det.contains("<ar:FchServDesde>20190301</ar:FchServDesde>"));
        assert!(det.contains("<ar:FchServHasta>20190331</ar:FchServHasta>"));
        assert!(det.contains("<ar:FchVtoPago>20190430</ar:FchVtoPago>"));
    }

    #[test]
    fn detail_xml_escapes_tax_description() {
        let mut invoice = sample_invoice();
        invoice.add_tax(99, "Percepción <IIBB> & otros", 100.0, 1.0, 1.0);
        let det = detail_xml(&invoice);
        assert!(det.contains("<ar:Desc>Percepción &lt;IIBB&gt; &amp; otros</ar:Desc>"));
        assert!(det.contains("<ar:Alic>1.00</ar:Alic>"));
    }

    // -- parse_authorization --------------------------------------------------

    fn approved_response() -> String {
        concat!(
            "<soap:Envelope><soap:Body><FECAESolicitarResponse>",
            "<FECAESolicitarResult>",
            "<FeCabResp><Cuit>20267565393</Cuit><PtoVta>4000</PtoVta><CbteTipo>6</CbteTipo>",
            "<FchProceso>20190401104500</FchProceso><CantReg>1</CantReg>",
            "<Resultado>A</Resultado><Reproceso>N</Reproceso></FeCabResp>",
            "<FeDetResp><FECAEDetResponse>",
            "<Concepto>1</Concepto><DocTipo>96</DocTipo><DocNro>12345678</DocNro>",
            "<CbteDesde>13</CbteDesde><CbteHasta>13</CbteHasta><CbteFch>20190401</CbteFch>",
            "<Resultado>A</Resultado><CAE>69076237925855</CAE><CAEFchVto>20190411</CAEFchVto>",
            "</FECAEDetResponse></FeDetResp>",
            "</FECAESolicitarResult>",
            "</FECAESolicitarResponse></soap:Body></soap:Envelope>"
        )
        .to_string()
    }

    #[test]
    fn parses_approved_authorization() {
        let auth = parse_authorization(&approved_response()).unwrap();
        assert_eq!(auth.result, AuthorizationResult::Approved);
        assert_eq!(auth.cae.as_deref(), Some("69076237925855"));
        assert_eq!(auth.cae_due_date, NaiveDate::from_ymd_opt(2019, 4, 11));
        assert_eq!(auth.voucher_number, 13);
        assert!(auth.observations.is_empty());
        assert!(auth.events.is_empty());
    }

    #[test]
    fn parses_rejection_with_observations() {
        let response = approved_response()
            .replace("<Resultado>A</Resultado><Reproceso>", "<Resultado>R</Resultado><Reproceso>")
            .replace(
                "<Resultado>A</Resultado><CAE>69076237925855</CAE><CAEFchVto>20190411</CAEFchVto>",
                concat!(
                    "<Resultado>R</Resultado><CAE></CAE><CAEFchVto></CAEFchVto>",
                    "<Observaciones><Obs><Code>10048</Code>",
                    "<Msg>El importe total no coincide</Msg></Obs></Observaciones>"
                ),
            );
        let auth = parse_authorization(&response).unwrap();
        assert_eq!(auth.result, AuthorizationResult::Rejected);
        assert_eq!(auth.cae, None);
        assert_eq!(auth.cae_due_date, None);
        assert_eq!(auth.observations.len(), 1);
        assert_eq!(auth.observations[0].code, 10048);
        assert!(auth.observations[0].message.contains("no coincide"));
    }

    #[test]
    fn service_errors_without_header_are_an_error() {
        let response = concat!(
            "<soap:Envelope><soap:Body><FECAESolicitarResponse>",
            "<FECAESolicitarResult><Errors><Err><Code>600</Code>",
            "<Msg>ValidacionDeToken: No validaron las fechas del token</Msg>",
            "</Err></Errors></FECAESolicitarResult>",
            "</FECAESolicitarResponse></soap:Body></soap:Envelope>"
        );
        let err = parse_authorization(response).unwrap_err();
        assert!(err.has_code(600));
        assert!(err.to_string().contains("ValidacionDeToken"));
    }

    #[test]
    fn duplicate_number_error_is_detectable() {
        let response = concat!(
            "<soap:Envelope><soap:Body><FECAESolicitarResponse>",
            "<FECAESolicitarResult><Errors><Err><Code>10016</Code>",
            "<Msg>El numero o fecha del comprobante no se corresponde con el proximo a autorizar</Msg>",
            "</Err></Errors></FECAESolicitarResult>",
            "</FECAESolicitarResponse></soap:Body></soap:Envelope>"
        );
        let err = parse_authorization(response).unwrap_err();
        assert!(err.has_code(10016));
        assert!(!err.has_code(600));
    }

    #[test]
    fn events_are_collected() {
        let response = approved_response().replace(
            "</FECAESolicitarResult>",
            concat!(
                "<Events><Evt><Code>99</Code><Msg>Ventana de mantenimiento programada</Msg></Evt></Events>",
                "</FECAESolicitarResult>"
            ),
        );
        let auth = parse_authorization(&response).unwrap();
        assert_eq!(auth.events.len(), 1);
        assert_eq!(auth.events[0].code, 99);
    }

    // -- ServerStatus ---------------------------------------------------------

    #[test]
    fn server_status_all_ok() {
        let ok = ServerStatus {
            app_server: "OK".into(),
            db_server: "OK".into(),
            auth_server: "OK".into(),
        };
        assert!(ok.all_ok());
        let degraded = ServerStatus {
            auth_server: "DOWN".into(),
            ..ok
        };
        assert!(!degraded.all_ok());
    }

    // -- collect_messages -----------------------------------------------------

    #[test]
    fn collect_messages_skips_malformed_entries() {
        let block = concat!(
            "<Err><Code>600</Code><Msg>primero</Msg></Err>",
            "<Err><Code>not-a-number</Code><Msg>ignorado</Msg></Err>",
            "<Err><Code>602</Code><Msg>segundo</Msg></Err>"
        );
        let messages = collect_messages(block, "Err");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].code, 600);
        assert_eq!(messages[1].code, 602);
    }
}

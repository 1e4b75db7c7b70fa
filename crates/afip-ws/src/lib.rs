//! # afip-ws — Typed Clients for the AFIP Web Services
//!
//! Clients for the two services behind Argentina's domestic electronic
//! invoicing workflow:
//!
//! - **WSAA** ([`wsaa`]): the authentication and authorization service.
//!   Exchanges a CMS-signed access ticket request (TRA) for an access
//!   ticket — the token/signature pair every other service call carries.
//! - **WSFEv1** ([`wsfe`]): the domestic invoicing service. Queries the
//!   last authorized voucher number, submits invoices with their VAT and
//!   tax lines, and obtains the CAE fiscal authorization code.
//!
//! Both clients share the SOAP 1.1 transport in [`soap`], which retries
//! transient transport failures ([`retry`]) and surfaces SOAP faults and
//! non-2xx statuses as typed errors. Access tickets can be cached across
//! process runs with [`ticket_store::TicketStore`] — the service rejects
//! repeated logins while a granted ticket is still valid, so reuse is not
//! an optimization but part of the protocol's contract.
//!
//! ## Flow
//!
//! ```text
//! TicketRequest → CmsSigner → WsaaClient::login_cms → AccessTicket
//!                                                         │
//!                     WsfeClient (Auth: token, sign, CUIT) ┴→ CAE
//! ```

pub mod invoice;
pub mod retry;
pub mod soap;
pub mod ticket_store;
pub mod wsaa;
pub mod wsfe;

pub use invoice::{AssociatedVoucher, Invoice, InvoiceError, OptionalData, Tax, VatLine};
pub use retry::RetryPolicy;
pub use soap::{SoapClient, SoapError};
pub use ticket_store::TicketStore;
pub use wsaa::{AccessTicket, WsaaClient, WsaaError};
pub use wsfe::{
    Authorization, AuthorizationResult, ServerStatus, ServiceMessage, VoucherInfo, WsfeClient,
    WsfeError,
};

//! # Integration Tests for the WSAA Client
//!
//! Exercises the authentication client against wiremock servers to
//! verify request construction, the doubly-encoded ticket parsing, SOAP
//! fault mapping, and the on-disk ticket cache — without requiring live
//! service access.

use chrono::{Duration, SecondsFormat, Utc};
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use afip_crypto::{Cms, Credentials, StaticCmsSigner};
use afip_ws::{SoapError, TicketStore, WsaaClient, WsaaError};

const LOGIN_ACTION: &str = "\"http://ar.gov.afip.dif.facturaelectronica/loginCms\"";

/// A `loginCmsReturn` response whose embedded ticket expires at the
/// given offset from now.
fn login_response(expires_in: Duration) -> String {
    let expiration = (Utc::now() + expires_in).to_rfc3339_opts(SecondsFormat::Secs, true);
    let ta = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<loginTicketResponse version="1.0">"#,
            "<header><uniqueId>2869090474</uniqueId>",
            "<generationTime>2019-04-01T11:48:02-03:00</generationTime>",
            "<expirationTime>{expiration}</expirationTime></header>",
            "<credentials><token>PD94bWwgdG9rZW4=</token><sign>c2lnbmF0dXJl</sign></credentials>",
            "</loginTicketResponse>"
        ),
        expiration = expiration
    );
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soapenv:Body><ns1:loginCmsResponse xmlns:ns1=\"http://wsaa.view.sua.dvadac.desein.afip.gov\">",
            "<loginCmsReturn>{escaped}</loginCmsReturn>",
            "</ns1:loginCmsResponse></soapenv:Body></soapenv:Envelope>"
        ),
        escaped = afip_core::xml::escape(&ta)
    )
}

fn client(server: &MockServer) -> WsaaClient {
    WsaaClient::new(Url::parse(&server.uri()).expect("server uri")).expect("client build")
}

fn signer() -> StaticCmsSigner {
    StaticCmsSigner::new(Cms::from_base64("TUlJRmZha2VDTVM=").unwrap())
}

#[tokio::test]
async fn login_cms_extracts_ticket_from_escaped_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("Content-Type", "text/xml; charset=utf-8"))
        .and(header("SOAPAction", LOGIN_ACTION))
        .and(body_string_contains("<ar:in0>TUlJRmZha2VDTVM=</ar:in0>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(Duration::hours(12))))
        .expect(1)
        .mount(&server)
        .await;

    let ticket = client(&server)
        .login_cms(&Cms::from_base64("TUlJRmZha2VDTVM=").unwrap())
        .await
        .expect("login");

    assert_eq!(ticket.token, "PD94bWwgdG9rZW4=");
    assert_eq!(ticket.sign, "c2lnbmF0dXJl");
    assert!(!ticket.is_expired(Utc::now()));
}

#[tokio::test]
async fn authenticate_signs_and_logs_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("loginCms"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(Duration::hours(12))))
        .expect(1)
        .mount(&server)
        .await;

    let ticket = client(&server)
        .authenticate(&signer(), "wsfe", 2400)
        .await
        .expect("authenticate");
    assert_eq!(ticket.token, "PD94bWwgdG9rZW4=");
}

#[tokio::test]
async fn soap_fault_maps_to_typed_error() {
    let server = MockServer::start().await;

    let fault = concat!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
        "<soapenv:Body><soapenv:Fault>",
        "<faultcode>ns1:coe.alreadyAuthenticated</faultcode>",
        "<faultstring>El CEE ya posee un TA valido para el acceso al WSN solicitado</faultstring>",
        "</soapenv:Fault></soapenv:Body></soapenv:Envelope>"
    );

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string(fault))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .login_cms(&Cms::from_base64("TUlJRmZha2VDTVM=").unwrap())
        .await
        .unwrap_err();

    match err {
        WsaaError::Soap(SoapError::Fault { code, message, .. }) => {
            assert_eq!(code, "ns1:coe.alreadyAuthenticated");
            assert!(message.contains("ya posee un TA valido"));
        }
        other => panic!("expected SOAP fault, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_ticket_document_is_reported() {
    let server = MockServer::start().await;

    let body = concat!(
        "<soapenv:Envelope><soapenv:Body><loginCmsResponse>",
        "<loginCmsReturn>&lt;loginTicketResponse/&gt;</loginCmsReturn>",
        "</loginCmsResponse></soapenv:Body></soapenv:Envelope>"
    );
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let err = client(&server)
        .login_cms(&Cms::from_base64("TUlJRmZha2VDTVM=").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WsaaError::MalformedTicket { .. }));
}

#[tokio::test]
async fn ticket_store_obtain_logs_in_once_then_reuses_cache() {
    let server = MockServer::start().await;

    // A second login attempt would trip the `.expect(1)` mock assertion.
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(Duration::hours(12))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TicketStore::new(dir.path());
    let credentials = Credentials::new("emitter.crt", "emitter.key");
    let wsaa = client(&server);

    let first = store
        .obtain(&wsaa, &signer(), "wsfe", 2400, &credentials)
        .await
        .expect("first obtain");
    let second = store
        .obtain(&wsaa, &signer(), "wsfe", 2400, &credentials)
        .await
        .expect("second obtain");

    assert_eq!(first, second);
}

#[tokio::test]
async fn ticket_store_expired_cache_triggers_fresh_login() {
    let server = MockServer::start().await;

    // First response expires immediately; the store must log in again.
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(Duration::seconds(30))))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TicketStore::new(dir.path());
    let credentials = Credentials::new("emitter.crt", "emitter.key");
    let wsaa = client(&server);

    for _ in 0..2 {
        store
            .obtain(&wsaa, &signer(), "wsfe", 2400, &credentials)
            .await
            .expect("obtain");
    }
}

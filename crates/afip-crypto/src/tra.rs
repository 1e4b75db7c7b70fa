//! # Access Ticket Request (TRA)
//!
//! The authentication service grants access tickets in exchange for a
//! signed `loginTicketRequest` (TRA) document. The TRA names the target
//! web service and a validity window; the service rejects requests whose
//! window has drifted too far from its own clock, so both edges are
//! stamped relative to the caller's current time.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use afip_core::xml;

/// Default requested ticket lifetime: five hours, matching the lifetime
/// the service itself grants.
pub const DEFAULT_TTL_SECS: i64 = 60 * 60 * 5;

/// The `loginTicketRequest` document requesting an access ticket for one
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRequest {
    /// Target service name (e.g. `wsfe`).
    pub service: String,
    /// Request identifier; unix seconds of the generation instant.
    pub unique_id: i64,
    /// Window start. Backdated by the TTL to absorb clock skew between
    /// caller and service.
    pub generation_time: DateTime<Utc>,
    /// Window end.
    pub expiration_time: DateTime<Utc>,
}

impl TicketRequest {
    /// Build a TRA for `service` valid for `ttl_secs`, stamped at `now`.
    ///
    /// The window is `[now - ttl, now + ttl]` and the unique id is `now`
    /// in unix seconds.
    pub fn new_at(service: impl Into<String>, ttl_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            service: service.into(),
            unique_id: now.timestamp(),
            generation_time: now - Duration::seconds(ttl_secs),
            expiration_time: now + Duration::seconds(ttl_secs),
        }
    }

    /// Build a TRA stamped at the current instant. See [`Self::new_at`].
    pub fn new(service: impl Into<String>, ttl_secs: i64) -> Self {
        Self::new_at(service, ttl_secs, Utc::now())
    }

    /// Render the canonical TRA XML document.
    pub fn to_xml(&self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<loginTicketRequest version="1.0">"#,
                "<header>",
                "<uniqueId>{unique_id}</uniqueId>",
                "<generationTime>{generation}</generationTime>",
                "<expirationTime>{expiration}</expirationTime>",
                "</header>",
                "<service>{service}</service>",
                "</loginTicketRequest>"
            ),
            unique_id = self.unique_id,
            generation = self
                .generation_time
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            expiration = self
                .expiration_time
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            service = xml::escape(&self.service),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 4, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_is_symmetric_around_now() {
        let tra = TicketRequest::new_at("wsfe", 2400, fixed_now());
        assert_eq!(tra.unique_id, fixed_now().timestamp());
        assert_eq!(fixed_now() - tra.generation_time, Duration::seconds(2400));
        assert_eq!(tra.expiration_time - fixed_now(), Duration::seconds(2400));
    }

    #[test]
    fn xml_shape() {
        let tra = TicketRequest::new_at("wsfe", 2400, fixed_now());
        let doc = tra.to_xml();
        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(doc.contains(r#"<loginTicketRequest version="1.0">"#));
        assert_eq!(
            xml::tag_text(&doc, "uniqueId"),
            Some(fixed_now().timestamp().to_string().as_str())
        );
        assert_eq!(
            xml::tag_text(&doc, "generationTime"),
            Some("2019-04-01T11:20:00+00:00")
        );
        assert_eq!(
            xml::tag_text(&doc, "expirationTime"),
            Some("2019-04-01T12:40:00+00:00")
        );
        assert_eq!(xml::tag_text(&doc, "service"), Some("wsfe"));
    }

    #[test]
    fn service_name_is_escaped() {
        let tra = TicketRequest::new_at("ws<fe>", 60, fixed_now());
        assert!(tra.to_xml().contains("<service>ws&lt;fe&gt;</service>"));
    }
}

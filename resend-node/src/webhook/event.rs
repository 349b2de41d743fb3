//! Inbound webhook verification and event routing.
//!
//! ```text
//! raw body + Svix headers → verify (unless disabled) → parse → subscribed? → WebhookOutcome
//! ```

use axum::http::HeaderMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ResendError, Result};
use crate::webhook::signature::{is_signature_verification_enabled, verify_svix_signature};

/// Event types Resend can deliver.
pub const KNOWN_EVENTS: &[&str] = &[
    "email.sent",
    "email.delivered",
    "email.delivery_delayed",
    "email.bounced",
    "email.opened",
    "email.clicked",
    "email.complained",
    "contact.created",
    "contact.updated",
    "contact.deleted",
    "domain.created",
    "domain.updated",
    "domain.deleted",
];

/// Subscription used when none is configured.
pub const DEFAULT_EVENTS: &[&str] = &["email.sent"];

pub fn is_known_event(event_type: &str) -> bool {
    KNOWN_EVENTS.contains(&event_type)
}

/// The three Svix headers, empty when absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvixHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl SvixHeaders {
    /// Build from a case-sensitive header lookup.
    ///
    /// Each header is looked up under its canonical lower-case name first and
    /// then under the capitalized variant (`svix-id`, then `Svix-Id`).
    pub fn from_lookup<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let get = |canonical: &str, capitalized: &str| {
            lookup(canonical)
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(capitalized))
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id: get("svix-id", "Svix-Id"),
            timestamp: get("svix-timestamp", "Svix-Timestamp"),
            signature: get("svix-signature", "Svix-Signature"),
        }
    }

    pub fn from_header_map(headers: &HeaderMap) -> Self {
        Self::from_lookup(|name| headers.get(name).and_then(|v| v.to_str().ok()))
    }
}

/// Signing secret and subscription for one webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub signing_secret: Option<String>,
    pub events: Vec<String>,
}

/// What to do with a verified (or unverified, when disabled) webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// The event is subscribed and should be handed downstream.
    Accepted { event_type: String, event: Value },
    /// Valid event the endpoint does not subscribe to; nothing is forwarded.
    NotSubscribed { event_type: String },
}

/// Verify and route one inbound webhook.
///
/// Verification is skipped entirely when the signing secret is unset or
/// blank. That mode accepts forged payloads and is logged on every call.
pub fn receive_webhook(
    settings: &WebhookSettings,
    headers: &SvixHeaders,
    body: &[u8],
) -> Result<WebhookOutcome> {
    if is_signature_verification_enabled(&settings.signing_secret) {
        let secret = settings.signing_secret.as_deref().unwrap_or_default();
        verify_svix_signature(
            body,
            &headers.id,
            &headers.timestamp,
            &headers.signature,
            secret,
        )?;
    } else {
        warn!(svix_id = %headers.id, "webhook_signature_verification_disabled");
    }

    let event: Value = serde_json::from_slice(body).map_err(|e| {
        ResendError::MalformedWebhookPayload(format!("body is not valid JSON: {e}"))
    })?;

    route_event(event, &settings.events)
}

/// Accept an event only if its `type` is in the subscribed set.
pub fn route_event(event: Value, subscribed: &[String]) -> Result<WebhookOutcome> {
    let event_type = match event.as_object().and_then(|o| o.get("type")) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => {
            return Err(ResendError::MalformedWebhookPayload(
                "expected JSON object with \"type\" field".to_string(),
            ))
        }
    };

    if !subscribed.iter().any(|s| *s == event_type) {
        info!(event_type = %event_type, "webhook_event_not_subscribed");
        return Ok(WebhookOutcome::NotSubscribed { event_type });
    }

    info!(event_type = %event_type, "webhook_event_accepted");
    Ok(WebhookOutcome::Accepted { event_type, event })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::signature::{decode_secret, sign};
    use serde_json::json;
    use std::collections::HashMap;

    const SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleS1mb3ItcmVzZW5kLWhvb2tz";

    fn settings(secret: Option<&str>) -> WebhookSettings {
        WebhookSettings {
            signing_secret: secret.map(|s| s.to_string()),
            events: vec!["email.sent".to_string(), "email.opened".to_string()],
        }
    }

    fn signed_headers(body: &[u8]) -> SvixHeaders {
        let key = decode_secret(SECRET).unwrap();
        SvixHeaders {
            id: "msg_2a".to_string(),
            timestamp: "1700000000".to_string(),
            signature: format!("v1,{}", sign(&key, "msg_2a", "1700000000", body)),
        }
    }

    #[test]
    fn test_headers_canonical_and_capitalized() {
        let mut map = HashMap::new();
        map.insert("svix-id", "msg_1");
        map.insert("Svix-Timestamp", "1700000000");
        map.insert("Svix-Signature", "v1,abc");

        let headers = SvixHeaders::from_lookup(|name| map.get(name).copied());

        assert_eq!(headers.id, "msg_1");
        assert_eq!(headers.timestamp, "1700000000");
        assert_eq!(headers.signature, "v1,abc");
    }

    #[test]
    fn test_headers_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert("svix-id", "msg_1".parse().unwrap());
        map.insert("svix-timestamp", "1700000000".parse().unwrap());

        let headers = SvixHeaders::from_header_map(&map);

        assert_eq!(headers.id, "msg_1");
        assert_eq!(headers.timestamp, "1700000000");
        assert!(headers.signature.is_empty());
    }

    #[test]
    fn test_receive_verified_subscribed_event() {
        let body = br#"{"type":"email.sent","data":{"email_id":"e1"}}"#;
        let outcome = receive_webhook(&settings(Some(SECRET)), &signed_headers(body), body).unwrap();

        match outcome {
            WebhookOutcome::Accepted { event_type, event } => {
                assert_eq!(event_type, "email.sent");
                assert_eq!(event["data"]["email_id"], "e1");
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_receive_not_subscribed() {
        let body = br#"{"type":"contact.deleted","data":{}}"#;
        let outcome = receive_webhook(&settings(Some(SECRET)), &signed_headers(body), body).unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::NotSubscribed {
                event_type: "contact.deleted".to_string()
            }
        );
    }

    #[test]
    fn test_receive_missing_headers() {
        let body = br#"{"type":"email.sent"}"#;
        let result = receive_webhook(&settings(Some(SECRET)), &SvixHeaders::default(), body);
        assert!(matches!(result, Err(ResendError::MissingSignatureHeaders)));
    }

    #[test]
    fn test_receive_invalid_signature() {
        let body = br#"{"type":"email.sent"}"#;
        let mut headers = signed_headers(body);
        headers.signature = "v1,AAAA".to_string();

        let result = receive_webhook(&settings(Some(SECRET)), &headers, body);
        assert!(matches!(result, Err(ResendError::InvalidSignature)));
    }

    #[test]
    fn test_receive_bypass_when_secret_blank() {
        let body = br#"{"type":"email.opened"}"#;
        for secret in [None, Some(""), Some("   ")] {
            let outcome =
                receive_webhook(&settings(secret), &SvixHeaders::default(), body).unwrap();
            assert!(matches!(outcome, WebhookOutcome::Accepted { .. }));
        }
    }

    #[test]
    fn test_receive_malformed_payload() {
        let result = receive_webhook(&settings(None), &SvixHeaders::default(), b"not json");
        assert!(matches!(result, Err(ResendError::MalformedWebhookPayload(_))));
    }

    #[test]
    fn test_route_event_requires_type() {
        let subscribed = vec!["email.sent".to_string()];

        let result = route_event(json!({"data": {}}), &subscribed);
        assert!(matches!(result, Err(ResendError::MalformedWebhookPayload(_))));

        let result = route_event(json!(["email.sent"]), &subscribed);
        assert!(matches!(result, Err(ResendError::MalformedWebhookPayload(_))));
    }

    #[test]
    fn test_route_event_non_string_type() {
        let subscribed = vec!["email.sent".to_string()];
        let outcome = route_event(json!({"type": 7}), &subscribed).unwrap();
        assert!(matches!(outcome, WebhookOutcome::NotSubscribed { .. }));
    }

    #[test]
    fn test_known_events() {
        assert!(is_known_event("email.delivery_delayed"));
        assert!(is_known_event("domain.deleted"));
        assert!(!is_known_event("email.unknown"));
        assert!(DEFAULT_EVENTS.iter().all(|e| is_known_event(e)));
    }
}

//! Queue message types for accepted webhook events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Queue name for verified, subscribed Resend events.
pub const EVENTS_QUEUE: &str = "resend_events";

/// A Resend webhook event handed to downstream workflow logic.
///
/// The payload is the event body exactly as Resend sent it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    /// Svix message id, stable across Resend's delivery retries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svix_id: Option<String>,
    /// Event type, e.g. `email.delivered`
    pub event_type: String,
    /// Full event body
    pub payload: Value,
}

impl EventMessage {
    pub fn new(svix_id: Option<String>, event_type: String, payload: Value) -> Self {
        Self {
            svix_id: svix_id.filter(|id| !id.is_empty()),
            event_type,
            payload,
        }
    }

    /// Message id used for broker-side tracking.
    pub fn message_id(&self) -> String {
        match &self.svix_id {
            Some(id) => id.clone(),
            None => format!("resend-{}", self.event_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_message_serialization() {
        let message = EventMessage::new(
            Some("msg_1".to_string()),
            "email.delivered".to_string(),
            json!({"type": "email.delivered", "data": {"email_id": "e1"}}),
        );

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"svix_id\":\"msg_1\""));

        let parsed: EventMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type, "email.delivered");
        assert_eq!(parsed.payload["data"]["email_id"], "e1");
    }

    #[test]
    fn test_event_message_without_svix_id() {
        let message = EventMessage::new(
            Some(String::new()),
            "contact.created".to_string(),
            json!({"type": "contact.created"}),
        );

        assert!(message.svix_id.is_none());
        assert_eq!(message.message_id(), "resend-contact.created");
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("svix_id"));
    }
}

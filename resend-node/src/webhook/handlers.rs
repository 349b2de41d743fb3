//! Webhook endpoint handlers.
//!
//! The Resend handler verifies the Svix signature, routes on the event type
//! and publishes subscribed events. Unsubscribed events are acknowledged with
//! 200 so Resend does not retry them.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ResendError;
use crate::queue::{EventMessage, Publisher};
use crate::webhook::event::{receive_webhook, SvixHeaders, WebhookOutcome, WebhookSettings};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<WebhookSettings>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(config: Config, publisher: Publisher) -> Self {
        let settings = WebhookSettings {
            signing_secret: config.webhook_signing_secret.clone(),
            events: config.webhook_events.clone(),
        };
        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            publisher,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Resend Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    fn rejected(status: &'static str, err: &ResendError) -> Json<Self> {
        Json(Self {
            status,
            event_type: None,
            error: Some(err.to_string()),
        })
    }
}

/// HTTP status and response status for a rejected webhook.
pub fn rejection_status(err: &ResendError) -> (StatusCode, &'static str) {
    match err {
        ResendError::MissingSignatureHeaders | ResendError::InvalidSignature => {
            (StatusCode::UNAUTHORIZED, "unauthorized")
        }
        ResendError::MalformedWebhookPayload(_) => (StatusCode::BAD_REQUEST, "invalid_payload"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    }
}

/// Resend webhook endpoint.
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what Resend signed.
pub async fn resend_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let svix = SvixHeaders::from_header_map(&headers);

    info!(
        svix_id = %svix.id,
        body_length = body.len(),
        has_signature = !svix.signature.is_empty(),
        "resend_webhook_received"
    );

    let outcome = match receive_webhook(&state.settings, &svix, &body) {
        Ok(outcome) => outcome,
        Err(e) => {
            let (code, status) = rejection_status(&e);
            warn!(svix_id = %svix.id, error = %e, status = status, "resend_webhook_rejected");
            return (code, WebhookResponse::rejected(status, &e));
        }
    };

    let (event_type, event) = match outcome {
        WebhookOutcome::Accepted { event_type, event } => (event_type, event),
        WebhookOutcome::NotSubscribed { event_type } => {
            return (
                StatusCode::OK,
                Json(WebhookResponse {
                    status: "ignored",
                    event_type: Some(event_type),
                    error: None,
                }),
            );
        }
    };

    let message = EventMessage::new(Some(svix.id.clone()), event_type.clone(), event);

    if let Err(e) = state.publisher.publish_event(&message).await {
        error!(error = %e, event_type = %event_type, "resend_event_publish_failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(WebhookResponse {
                status: "error",
                event_type: Some(event_type),
                error: None,
            }),
        );
    }

    info!(svix_id = %svix.id, event_type = %event_type, "resend_event_enqueued");

    (
        StatusCode::OK,
        Json(WebhookResponse {
            status: "enqueued",
            event_type: Some(event_type),
            error: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status() {
        assert_eq!(
            rejection_status(&ResendError::MissingSignatureHeaders),
            (StatusCode::UNAUTHORIZED, "unauthorized")
        );
        assert_eq!(
            rejection_status(&ResendError::InvalidSignature),
            (StatusCode::UNAUTHORIZED, "unauthorized")
        );
        assert_eq!(
            rejection_status(&ResendError::MalformedWebhookPayload("x".to_string())),
            (StatusCode::BAD_REQUEST, "invalid_payload")
        );

        let bad_secret = crate::webhook::signature::decode_secret("whsec_***").unwrap_err();
        assert_eq!(
            rejection_status(&bad_secret),
            (StatusCode::INTERNAL_SERVER_ERROR, "error")
        );
    }

    #[test]
    fn test_ignored_response_shape() {
        let response = WebhookResponse {
            status: "ignored",
            event_type: Some("domain.created".to_string()),
            error: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ignored");
        assert_eq!(json["event_type"], "domain.created");
        assert!(json.get("error").is_none());
    }
}

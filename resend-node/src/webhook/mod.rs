//! Webhook receiver for Resend event callbacks.
//!
//! This module provides:
//! - Svix signature verification
//! - Event routing against the configured subscription
//! - The axum handlers and router served by the `resend-webhook` binary

pub mod event;
pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use event::{receive_webhook, route_event, SvixHeaders, WebhookOutcome, WebhookSettings};
pub use handlers::{health, resend_webhook, AppState, HealthResponse, WebhookResponse};
pub use signature::{is_signature_verification_enabled, verify_svix_signature};

/// Path Resend is configured to call.
pub const WEBHOOK_PATH: &str = "/webhooks/resend";

/// All receiver routes, with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(WEBHOOK_PATH, post(resend_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

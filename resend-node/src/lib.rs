//! Resend API workflow steps and webhook receiver.
//!
//! This library backs two binaries:
//! - `resend-step`: builds and dispatches one API operation from a JSON field bag
//! - `resend-webhook`: verifies Svix-signed Resend callbacks and enqueues them
//!
//! ## Architecture
//!
//! ```text
//! field bag → Step → ApiRequest → ResendClient → Resend API
//! Resend → Webhook Server (Svix check, event filter) → resend_events queue
//! ```

pub mod binary;
pub mod client;
pub mod config;
pub mod error;
pub mod queue;
pub mod transform;
pub mod webhook;

// Re-export commonly used types
pub use binary::{BinaryData, BinarySource, FileBinarySource, MemoryBinarySource};
pub use client::{ListResponse, ResendClient};
pub use config::Config;
pub use error::{ResendError, Result};
pub use queue::{EventMessage, Publisher, EVENTS_QUEUE};
pub use transform::{ApiRequest, Step};
pub use webhook::{receive_webhook, verify_svix_signature, AppState, WebhookOutcome};

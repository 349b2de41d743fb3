//! Queue module for RabbitMQ operations.
//!
//! Verified webhook events leave the receiver through a single durable queue:
//!
//! ```text
//! Resend → Webhook Server → resend_events queue → workflow consumers
//! ```

pub mod publisher;
pub mod types;

pub use publisher::Publisher;
pub use types::{EventMessage, EVENTS_QUEUE};

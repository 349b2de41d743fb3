//! Error type shared by the transformers, the webhook verifier and the client.

use thiserror::Error;

/// Errors surfaced by request building, webhook verification and dispatch.
///
/// None of these are retried internally. Validation errors are raised before
/// any network call is made.
#[derive(Debug, Error)]
pub enum ResendError {
    /// A field the operation cannot be sent without is empty or absent.
    #[error("{0}")]
    MissingRequiredField(String),

    /// Attachment size or batch count over the API limit.
    #[error("{0}")]
    LimitExceeded(String),

    /// One of `svix-id`, `svix-timestamp` or `svix-signature` is missing or empty.
    #[error("Missing required Svix headers for webhook verification")]
    MissingSignatureHeaders,

    /// No `v1` signature in the header matched the expected signature.
    #[error("Invalid webhook signature - ensure your signing secret is correct")]
    InvalidSignature,

    /// The configured signing secret is not valid base64 after the `whsec_` prefix.
    #[error("Webhook signing secret is not valid base64: {0}")]
    BadSecretEncoding(#[from] base64::DecodeError),

    /// Inbound body is not a JSON object with a `type` field.
    #[error("Invalid webhook payload - {0}")]
    MalformedWebhookPayload(String),

    /// Reading an attachment's binary slot failed.
    #[error("Error reading binary data from property \"{slot}\": {source}")]
    BinaryData {
        slot: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Resend API answered with a non-success status.
    #[error("Resend API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Talking to the message broker failed (connect, declare or publish).
    #[error("Queue operation failed: {0}")]
    Queue(#[from] lapin::Error),
}

impl ResendError {
    pub(crate) fn missing(message: impl Into<String>) -> Self {
        ResendError::MissingRequiredField(message.into())
    }

    pub(crate) fn limit(message: impl Into<String>) -> Self {
        ResendError::LimitExceeded(message.into())
    }

    /// True for failures caused by the caller's input rather than by the
    /// environment (network, configuration).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ResendError::MissingRequiredField(_) | ResendError::LimitExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ResendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors() {
        assert!(ResendError::missing("Email is required").is_validation());
        assert!(ResendError::limit("too many").is_validation());
        assert!(!ResendError::InvalidSignature.is_validation());
        assert!(!ResendError::MissingSignatureHeaders.is_validation());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ResendError::missing("Topic name is required").to_string(),
            "Topic name is required"
        );
        let err = ResendError::BinaryData {
            slot: "data".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(
            err.to_string(),
            "Error reading binary data from property \"data\": gone"
        );
    }
}

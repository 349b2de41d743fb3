//! Request transformers.
//!
//! Each operation takes a typed field bag and produces an [`ApiRequest`]:
//! method, path, and an optional query or JSON body. Validation happens here,
//! before anything reaches the network.
//!
//! ## Processing Flow
//!
//! ```text
//! Step (resource + operation + fields) → Step::build() → ApiRequest → ResendClient
//! ```

pub mod attachments;
pub mod broadcasts;
pub mod contacts;
pub mod content;
pub mod emails;
pub mod helpers;
pub mod pagination;
pub mod segments;
pub mod templates;
pub mod topics;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::binary::BinarySource;
use crate::error::{ResendError, Result};

pub use broadcasts::BroadcastOperation;
pub use contacts::ContactOperation;
pub use emails::EmailOperation;
pub use helpers::{key_value_pairs_to_object, split_emails, KeyValuePair};
pub use pagination::{prepare_pagination, PaginationFields, PaginationQuery};
pub use segments::SegmentOperation;
pub use templates::TemplateOperation;
pub use topics::TopicOperation;

/// A request ready for dispatch against the Resend API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments below the API base URL, unescaped
    pub segments: Vec<String>,
    pub query: Option<PaginationQuery>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: None,
            body: None,
        }
    }

    pub fn with_query(mut self, query: PaginationQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path as written in the API reference, e.g. `/broadcasts/b1/send`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// List operations answer with `{object: "list", data, has_more}`.
    pub fn is_list(&self) -> bool {
        self.query.is_some()
    }

    /// Printable description, used by dry runs.
    pub fn describe(&self) -> Value {
        let mut out = json!({
            "method": self.method.as_str(),
            "path": self.path(),
        });
        if let Some(query) = &self.query {
            out["query"] = json!(query);
        }
        if let Some(body) = &self.body {
            out["body"] = body.clone();
        }
        out
    }
}

/// Field bag for operations that address one resource by `id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdFields {
    pub id: String,
}

/// Fail with `"<label> is required"` when an identifier is empty.
pub(crate) fn require_id<'a>(value: &'a str, label: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ResendError::missing(format!("{label} is required")));
    }
    Ok(trimmed)
}

/// One workflow step: a resource, an operation on it, and its fields.
///
/// Deserializes from the host's parameter layout:
///
/// ```json
/// {"resource": "emails", "operation": "send", "from": "...", "to": "..."}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum Step {
    Emails(EmailOperation),
    Contacts(ContactOperation),
    Segments(SegmentOperation),
    Broadcasts(BroadcastOperation),
    Topics(TopicOperation),
    Templates(TemplateOperation),
}

impl Step {
    pub fn resource(&self) -> &'static str {
        match self {
            Step::Emails(_) => "emails",
            Step::Contacts(_) => "contacts",
            Step::Segments(_) => "segments",
            Step::Broadcasts(_) => "broadcasts",
            Step::Topics(_) => "topics",
            Step::Templates(_) => "templates",
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Step::Emails(op) => op.name(),
            Step::Contacts(op) => op.name(),
            Step::Segments(op) => op.name(),
            Step::Broadcasts(op) => op.name(),
            Step::Topics(op) => op.name(),
            Step::Templates(op) => op.name(),
        }
    }

    /// Build the outbound request. Only Send Email touches `binaries`.
    pub async fn build<B: BinarySource>(&self, binaries: &B) -> Result<ApiRequest> {
        let request = match self {
            Step::Emails(op) => op.build(binaries).await?,
            Step::Contacts(op) => op.build()?,
            Step::Segments(op) => op.build()?,
            Step::Broadcasts(op) => op.build()?,
            Step::Topics(op) => op.build()?,
            Step::Templates(op) => op.build()?,
        };

        info!(
            resource = self.resource(),
            operation = self.operation(),
            method = %request.method,
            path = %request.path(),
            has_body = request.body.is_some(),
            "step_request_built"
        );

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::MemoryBinarySource;

    async fn build(step: Value) -> Result<ApiRequest> {
        let step: Step = serde_json::from_value(step).unwrap();
        step.build(&MemoryBinarySource::new()).await
    }

    #[test]
    fn test_request_path_and_describe() {
        let request = ApiRequest::new(Method::POST, &["broadcasts", "b_1", "send"])
            .with_body(&json!({}))
            .unwrap();

        assert_eq!(request.path(), "/broadcasts/b_1/send");
        assert_eq!(
            request.describe(),
            json!({"method": "POST", "path": "/broadcasts/b_1/send", "body": {}})
        );
        assert!(!request.is_list());
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(" e_1 ", "Email ID").unwrap(), "e_1");
        let err = require_id("  ", "Email ID").unwrap_err();
        assert_eq!(err.to_string(), "Email ID is required");
    }

    #[test]
    fn test_step_names() {
        let step: Step = serde_json::from_value(json!({
            "resource": "contacts",
            "operation": "addToSegment",
            "contactId": "c_1",
            "segmentId": "s_1"
        }))
        .unwrap();

        assert_eq!(step.resource(), "contacts");
        assert_eq!(step.operation(), "addToSegment");
    }

    #[tokio::test]
    async fn test_every_list_operation_paginates() {
        for resource in ["emails", "contacts", "segments", "broadcasts", "topics", "templates"] {
            let request = build(json!({
                "resource": resource,
                "operation": "list",
                "limit": 10,
                "after": "cursor123"
            }))
            .await
            .unwrap();

            assert_eq!(request.method, Method::GET);
            assert_eq!(request.path(), format!("/{resource}"));
            assert!(request.is_list());
            assert_eq!(
                json!(request.query.unwrap()),
                json!({"limit": 10, "after": "cursor123"})
            );
            assert!(request.body.is_none());
        }
    }

    #[tokio::test]
    async fn test_get_by_id_paths() {
        let cases = [
            ("emails", "/emails/x_1"),
            ("segments", "/segments/x_1"),
            ("broadcasts", "/broadcasts/x_1"),
            ("topics", "/topics/x_1"),
            ("templates", "/templates/x_1"),
        ];
        for (resource, path) in cases {
            let request = build(json!({"resource": resource, "operation": "get", "id": "x_1"}))
                .await
                .unwrap();
            assert_eq!(request.method, Method::GET);
            assert_eq!(request.path(), path);
        }
    }

    #[tokio::test]
    async fn test_get_requires_id() {
        let err = build(json!({"resource": "templates", "operation": "get"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ResendError::MissingRequiredField(_)));
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let result: std::result::Result<Step, _> =
            serde_json::from_value(json!({"resource": "templates", "operation": "delete"}));
        assert!(result.is_err());
    }
}

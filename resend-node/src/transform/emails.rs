//! Email operations: send, batch send, list, get, cancel, update.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::attachments::{process_attachments, Attachment, AttachmentEntry};
use super::content::{select_content, Content, ContentFields, ContentMode};
use super::helpers::{
    email_tags, key_value_pairs_to_object, non_empty, optional_emails, repeated, split_emails,
    EmailTag, KeyValuePair, TagEntry,
};
use super::pagination::{prepare_pagination, PaginationFields};
use super::{require_id, ApiRequest, IdFields};
use crate::binary::BinarySource;
use crate::error::{ResendError, Result};

/// Most emails the batch endpoint takes in one request.
pub const BATCH_MAX_EMAILS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum EmailOperation {
    Send(SendEmailFields),
    SendBatch(SendBatchFields),
    List(PaginationFields),
    Get(IdFields),
    Cancel(IdFields),
    Update(UpdateEmailFields),
}

impl EmailOperation {
    pub fn name(&self) -> &'static str {
        match self {
            EmailOperation::Send(_) => "send",
            EmailOperation::SendBatch(_) => "sendBatch",
            EmailOperation::List(_) => "list",
            EmailOperation::Get(_) => "get",
            EmailOperation::Cancel(_) => "cancel",
            EmailOperation::Update(_) => "update",
        }
    }

    pub async fn build<B: BinarySource>(&self, binaries: &B) -> Result<ApiRequest> {
        match self {
            EmailOperation::Send(fields) => {
                let body = prepare_send_email(fields, binaries).await?;
                ApiRequest::new(Method::POST, &["emails"]).with_body(&body)
            }
            EmailOperation::SendBatch(fields) => {
                let body = prepare_send_batch(fields)?;
                ApiRequest::new(Method::POST, &["emails", "batch"]).with_body(&body)
            }
            EmailOperation::List(fields) => {
                Ok(ApiRequest::new(Method::GET, &["emails"]).with_query(prepare_pagination(fields)))
            }
            EmailOperation::Get(fields) => {
                let id = require_id(&fields.id, "Email ID")?;
                Ok(ApiRequest::new(Method::GET, &["emails", id]))
            }
            EmailOperation::Cancel(fields) => {
                let id = require_id(&fields.id, "Email ID")?;
                Ok(ApiRequest::new(Method::POST, &["emails", id, "cancel"]))
            }
            EmailOperation::Update(fields) => {
                let id = require_id(&fields.id, "Email ID")?;
                let body = UpdateEmailBody {
                    scheduled_at: non_empty(fields.scheduled_at.trim()),
                };
                ApiRequest::new(Method::PATCH, &["emails", id]).with_body(&body)
            }
        }
    }
}

// =============================================================================
// Send
// =============================================================================

/// Field bag for Send Email.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendEmailFields {
    pub from: String,
    /// Comma-separated recipients
    pub to: String,
    pub subject: String,
    #[serde(flatten)]
    pub content: ContentFields,
    pub cc: String,
    pub bcc: String,
    pub reply_to: String,
    pub topic_id: String,
    #[serde(deserialize_with = "repeated")]
    pub attachments: Vec<AttachmentEntry>,
    #[serde(deserialize_with = "repeated")]
    pub headers: Vec<KeyValuePair>,
    #[serde(deserialize_with = "repeated")]
    pub tags: Vec<TagEntry>,
    /// ISO 8601 or natural language ("in 1 hour"), passed through as-is
    pub scheduled_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendEmailBody {
    pub from: String,
    pub to: Vec<String>,
    #[serde(flatten)]
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<EmailTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

/// Build the Send Email body.
///
/// Requires `from` and at least one `to` address, plus `subject` unless a
/// template is used (in which case the template id is required instead).
/// Required fields are checked before any attachment is read.
pub async fn prepare_send_email<B: BinarySource>(
    fields: &SendEmailFields,
    binaries: &B,
) -> Result<SendEmailBody> {
    let to = split_emails(&fields.to);
    if fields.from.trim().is_empty() || to.is_empty() {
        return Err(ResendError::missing("From and To fields are required"));
    }

    let content = select_content(
        &fields.content,
        &fields.subject,
        ContentMode::Create {
            include_subject: true,
        },
    );

    if let Content::Template { template } = &content {
        if template.id.is_empty() {
            return Err(ResendError::missing(
                "Template is required when using a template",
            ));
        }
    }
    if !content.is_template() && content.subject().unwrap_or_default().trim().is_empty() {
        return Err(ResendError::missing(
            "Subject is required when not using a template",
        ));
    }

    let attachments = if fields.attachments.is_empty() {
        None
    } else {
        Some(process_attachments(&fields.attachments, binaries).await?).filter(|a| !a.is_empty())
    };

    let body = SendEmailBody {
        from: fields.from.clone(),
        to,
        content,
        cc: optional_emails(&fields.cc),
        bcc: optional_emails(&fields.bcc),
        reply_to: optional_emails(&fields.reply_to),
        topic_id: non_empty(&fields.topic_id),
        attachments,
        headers: key_value_pairs_to_object(&fields.headers),
        tags: email_tags(&fields.tags),
        scheduled_at: non_empty(&fields.scheduled_at),
    };

    info!(
        recipients = body.to.len(),
        uses_template = body.content.is_template(),
        attachments = body.attachments.as_ref().map(|a| a.len()).unwrap_or(0),
        scheduled = body.scheduled_at.is_some(),
        "send_email_prepared"
    );

    Ok(body)
}

// =============================================================================
// Batch
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendBatchFields {
    #[serde(deserialize_with = "repeated")]
    pub batch_emails: Vec<BatchEmailFields>,
}

/// One email in a batch. Batch emails carry inline content only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchEmailFields {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub reply_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEmailBody {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
}

/// Build the batch body. Any invalid email fails the whole batch.
pub fn prepare_send_batch(fields: &SendBatchFields) -> Result<Vec<BatchEmailBody>> {
    let count = fields.batch_emails.len();
    if count == 0 {
        return Err(ResendError::missing(
            "At least one email is required for batch send",
        ));
    }
    if count > BATCH_MAX_EMAILS {
        warn!(count = count, max = BATCH_MAX_EMAILS, "batch_email_limit_exceeded");
        return Err(ResendError::limit(format!(
            "Batch send supports maximum {BATCH_MAX_EMAILS} emails, you provided {count}"
        )));
    }

    let emails = fields
        .batch_emails
        .iter()
        .enumerate()
        .map(|(index, email)| prepare_batch_email(index, email))
        .collect::<Result<Vec<_>>>()?;

    info!(count = emails.len(), "send_batch_prepared");

    Ok(emails)
}

fn prepare_batch_email(index: usize, email: &BatchEmailFields) -> Result<BatchEmailBody> {
    let to = split_emails(&email.to);
    if email.from.trim().is_empty() || to.is_empty() || email.subject.trim().is_empty() {
        return Err(ResendError::missing(format!(
            "Batch email {} requires From, To and Subject",
            index + 1
        )));
    }

    let html = non_empty(&email.html);
    let text = non_empty(&email.text);
    if html.is_none() && text.is_none() {
        return Err(ResendError::missing(format!(
            "Email \"{}\" must have at least HTML or Text content",
            email.subject
        )));
    }

    Ok(BatchEmailBody {
        from: email.from.clone(),
        to,
        subject: email.subject.clone(),
        html,
        text,
        reply_to: optional_emails(&email.reply_to),
    })
}

// =============================================================================
// Update
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateEmailFields {
    pub id: String,
    pub scheduled_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateEmailBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

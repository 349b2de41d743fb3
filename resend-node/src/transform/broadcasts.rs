//! Broadcast operations.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::content::{select_content, Content, ContentFields, ContentMode};
use super::helpers::{non_empty, optional_emails};
use super::pagination::{prepare_pagination, PaginationFields};
use super::{require_id, ApiRequest, IdFields};
use crate::error::{ResendError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum BroadcastOperation {
    Create(BroadcastFields),
    List(PaginationFields),
    Get(IdFields),
    Update(UpdateBroadcastFields),
    Send(SendBroadcastFields),
    Delete(IdFields),
}

impl BroadcastOperation {
    pub fn name(&self) -> &'static str {
        match self {
            BroadcastOperation::Create(_) => "create",
            BroadcastOperation::List(_) => "list",
            BroadcastOperation::Get(_) => "get",
            BroadcastOperation::Update(_) => "update",
            BroadcastOperation::Send(_) => "send",
            BroadcastOperation::Delete(_) => "delete",
        }
    }

    pub fn build(&self) -> Result<ApiRequest> {
        match self {
            BroadcastOperation::Create(fields) => {
                let body = prepare_create_broadcast(fields)?;
                ApiRequest::new(Method::POST, &["broadcasts"]).with_body(&body)
            }
            BroadcastOperation::List(fields) => Ok(ApiRequest::new(Method::GET, &["broadcasts"])
                .with_query(prepare_pagination(fields))),
            BroadcastOperation::Get(fields) => {
                let id = require_id(&fields.id, "Broadcast ID")?;
                Ok(ApiRequest::new(Method::GET, &["broadcasts", id]))
            }
            BroadcastOperation::Update(fields) => {
                let id = require_id(&fields.id, "Broadcast ID")?;
                let body = prepare_update_broadcast(&fields.broadcast);
                ApiRequest::new(Method::PATCH, &["broadcasts", id]).with_body(&body)
            }
            BroadcastOperation::Send(fields) => {
                let id = require_id(&fields.broadcast_id, "Broadcast ID")?;
                let body = SendBroadcastBody {
                    scheduled_at: non_empty(fields.scheduled_at.trim()),
                };
                ApiRequest::new(Method::POST, &["broadcasts", id, "send"]).with_body(&body)
            }
            BroadcastOperation::Delete(fields) => {
                let id = require_id(&fields.id, "Broadcast ID")?;
                Ok(ApiRequest::new(Method::DELETE, &["broadcasts", id]))
            }
        }
    }
}

/// Fields shared by Create and Update Broadcast.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BroadcastFields {
    pub segment_id: String,
    pub from: String,
    pub subject: String,
    pub name: String,
    #[serde(flatten)]
    pub content: ContentFields,
    pub topic_id: String,
    pub reply_to: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBroadcastFields {
    pub id: String,
    #[serde(flatten)]
    pub broadcast: BroadcastFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BroadcastBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
}

/// Create body. `from` and `subject` are mandatory; the subject lives at the
/// top level, never inside the content block.
pub fn prepare_create_broadcast(fields: &BroadcastFields) -> Result<BroadcastBody> {
    if fields.from.is_empty() || fields.subject.is_empty() {
        return Err(ResendError::missing("From and Subject are required"));
    }

    Ok(BroadcastBody {
        segment_id: non_empty(&fields.segment_id),
        from: Some(fields.from.clone()),
        subject: Some(fields.subject.clone()),
        name: non_empty(&fields.name),
        content: select_content(
            &fields.content,
            &fields.subject,
            ContentMode::Create {
                include_subject: false,
            },
        ),
        topic_id: non_empty(&fields.topic_id),
        reply_to: optional_emails(&fields.reply_to),
    })
}

/// Partial update: only fields that were given end up in the body.
pub fn prepare_update_broadcast(fields: &BroadcastFields) -> BroadcastBody {
    BroadcastBody {
        segment_id: non_empty(&fields.segment_id),
        from: non_empty(&fields.from),
        subject: non_empty(&fields.subject),
        name: non_empty(&fields.name),
        content: select_content(&fields.content, &fields.subject, ContentMode::Update),
        topic_id: non_empty(&fields.topic_id),
        reply_to: optional_emails(&fields.reply_to),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendBroadcastFields {
    pub broadcast_id: String,
    pub scheduled_at: String,
}

/// `{}` sends immediately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendBroadcastBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

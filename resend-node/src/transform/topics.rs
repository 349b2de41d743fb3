//! Topic operations.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::helpers::{empty_as_none, non_empty};
use super::pagination::{prepare_pagination, PaginationFields};
use super::{require_id, ApiRequest, IdFields};
use crate::error::{ResendError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum TopicOperation {
    Create(CreateTopicFields),
    List(PaginationFields),
    Get(IdFields),
    Update(UpdateTopicFields),
    Delete(IdFields),
}

impl TopicOperation {
    pub fn name(&self) -> &'static str {
        match self {
            TopicOperation::Create(_) => "create",
            TopicOperation::List(_) => "list",
            TopicOperation::Get(_) => "get",
            TopicOperation::Update(_) => "update",
            TopicOperation::Delete(_) => "delete",
        }
    }

    pub fn build(&self) -> Result<ApiRequest> {
        match self {
            TopicOperation::Create(fields) => {
                let body = prepare_create_topic(fields)?;
                ApiRequest::new(Method::POST, &["topics"]).with_body(&body)
            }
            TopicOperation::List(fields) => Ok(ApiRequest::new(Method::GET, &["topics"])
                .with_query(prepare_pagination(fields))),
            TopicOperation::Get(fields) => {
                let id = require_id(&fields.id, "Topic ID")?;
                Ok(ApiRequest::new(Method::GET, &["topics", id]))
            }
            TopicOperation::Update(fields) => {
                let id = require_id(&fields.id, "Topic ID")?;
                let body = TopicBody {
                    name: non_empty(&fields.name),
                    default_subscription: None,
                    description: non_empty(&fields.description),
                    visibility: fields.visibility,
                };
                ApiRequest::new(Method::PATCH, &["topics", id]).with_body(&body)
            }
            TopicOperation::Delete(fields) => {
                let id = require_id(&fields.id, "Topic ID")?;
                Ok(ApiRequest::new(Method::DELETE, &["topics", id]))
            }
        }
    }
}

/// Whether contacts start out subscribed to a new topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultSubscription {
    #[default]
    OptIn,
    OptOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTopicFields {
    pub name: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub default_subscription: Option<DefaultSubscription>,
    pub description: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTopicFields {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_subscription: Option<DefaultSubscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Create body: `default_subscription` and `visibility` fall back to
/// `opt_in` and `public`.
pub fn prepare_create_topic(fields: &CreateTopicFields) -> Result<TopicBody> {
    if fields.name.is_empty() {
        return Err(ResendError::missing("Topic name is required"));
    }

    Ok(TopicBody {
        name: Some(fields.name.clone()),
        default_subscription: Some(fields.default_subscription.unwrap_or_default()),
        description: non_empty(&fields.description),
        visibility: Some(fields.visibility.unwrap_or_default()),
    })
}

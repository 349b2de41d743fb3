//! Segment operations.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::helpers::non_empty;
use super::pagination::{prepare_pagination, PaginationFields};
use super::{require_id, ApiRequest, IdFields};
use crate::error::{ResendError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum SegmentOperation {
    Create(SegmentFields),
    List(PaginationFields),
    Get(IdFields),
    Update(UpdateSegmentFields),
    Delete(IdFields),
}

impl SegmentOperation {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentOperation::Create(_) => "create",
            SegmentOperation::List(_) => "list",
            SegmentOperation::Get(_) => "get",
            SegmentOperation::Update(_) => "update",
            SegmentOperation::Delete(_) => "delete",
        }
    }

    pub fn build(&self) -> Result<ApiRequest> {
        match self {
            SegmentOperation::Create(fields) => {
                if fields.name.trim().is_empty() {
                    return Err(ResendError::missing("Segment name is required"));
                }
                ApiRequest::new(Method::POST, &["segments"]).with_body(&fields.body())
            }
            SegmentOperation::List(fields) => Ok(ApiRequest::new(Method::GET, &["segments"])
                .with_query(prepare_pagination(fields))),
            SegmentOperation::Get(fields) => {
                let id = require_id(&fields.id, "Segment ID")?;
                Ok(ApiRequest::new(Method::GET, &["segments", id]))
            }
            SegmentOperation::Update(fields) => {
                let id = require_id(&fields.id, "Segment ID")?;
                ApiRequest::new(Method::PATCH, &["segments", id]).with_body(&fields.segment.body())
            }
            SegmentOperation::Delete(fields) => {
                let id = require_id(&fields.id, "Segment ID")?;
                Ok(ApiRequest::new(Method::DELETE, &["segments", id]))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SegmentFields {
    pub name: String,
    pub description: String,
}

impl SegmentFields {
    fn body(&self) -> SegmentBody {
        SegmentBody {
            name: non_empty(&self.name),
            description: non_empty(&self.description),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSegmentFields {
    pub id: String,
    #[serde(flatten)]
    pub segment: SegmentFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

//! Contact operations, including segment membership.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::helpers::{contact_properties, non_empty, repeated, ContactProperty};
use super::pagination::{prepare_pagination, PaginationFields};
use super::{require_id, ApiRequest};
use crate::error::{ResendError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ContactOperation {
    Create(CreateContactFields),
    List(PaginationFields),
    Get(ContactLookupFields),
    Update(UpdateContactFields),
    Delete(ContactLookupFields),
    AddToSegment(SegmentMembershipFields),
    RemoveFromSegment(SegmentMembershipFields),
}

impl ContactOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ContactOperation::Create(_) => "create",
            ContactOperation::List(_) => "list",
            ContactOperation::Get(_) => "get",
            ContactOperation::Update(_) => "update",
            ContactOperation::Delete(_) => "delete",
            ContactOperation::AddToSegment(_) => "addToSegment",
            ContactOperation::RemoveFromSegment(_) => "removeFromSegment",
        }
    }

    pub fn build(&self) -> Result<ApiRequest> {
        match self {
            ContactOperation::Create(fields) => {
                let body = prepare_create_contact(fields)?;
                ApiRequest::new(Method::POST, &["contacts"]).with_body(&body)
            }
            ContactOperation::List(fields) => Ok(ApiRequest::new(Method::GET, &["contacts"])
                .with_query(prepare_pagination(fields))),
            ContactOperation::Get(fields) => {
                let id = require_id(&fields.contact_id_or_email, "Contact ID or email")?;
                Ok(ApiRequest::new(Method::GET, &["contacts", id]))
            }
            ContactOperation::Update(fields) => {
                let id = require_id(&fields.contact_id_or_email, "Contact ID or email")?;
                let body = prepare_update_contact(fields);
                ApiRequest::new(Method::PATCH, &["contacts", id]).with_body(&body)
            }
            ContactOperation::Delete(fields) => {
                let id = require_id(&fields.contact_id_or_email, "Contact ID or email")?;
                Ok(ApiRequest::new(Method::DELETE, &["contacts", id]))
            }
            ContactOperation::AddToSegment(fields) => fields.request(Method::POST),
            ContactOperation::RemoveFromSegment(fields) => fields.request(Method::DELETE),
        }
    }
}

/// Body for create and update. Update leaves out whatever was not given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateContactFields {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub unsubscribed: bool,
    #[serde(deserialize_with = "repeated")]
    pub properties: Vec<ContactProperty>,
}

pub fn prepare_create_contact(fields: &CreateContactFields) -> Result<ContactBody> {
    if fields.email.trim().is_empty() {
        return Err(ResendError::missing("Email is required"));
    }

    Ok(ContactBody {
        email: Some(fields.email.clone()),
        first_name: non_empty(&fields.first_name),
        last_name: non_empty(&fields.last_name),
        unsubscribed: Some(fields.unsubscribed),
        properties: contact_properties(&fields.properties),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateContactFields {
    pub contact_id_or_email: String,
    pub first_name: String,
    pub last_name: String,
    pub unsubscribed: Option<bool>,
    #[serde(deserialize_with = "repeated")]
    pub properties: Vec<ContactProperty>,
}

pub fn prepare_update_contact(fields: &UpdateContactFields) -> ContactBody {
    ContactBody {
        email: None,
        first_name: non_empty(&fields.first_name),
        last_name: non_empty(&fields.last_name),
        unsubscribed: fields.unsubscribed,
        properties: contact_properties(&fields.properties),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactLookupFields {
    pub contact_id_or_email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentMembershipFields {
    pub contact_id: String,
    pub segment_id: String,
}

impl SegmentMembershipFields {
    fn request(&self, method: Method) -> Result<ApiRequest> {
        let contact = require_id(&self.contact_id, "Contact ID")?;
        let segment = require_id(&self.segment_id, "Segment ID")?;
        Ok(ApiRequest::new(
            method,
            &["contacts", contact, "segments", segment],
        ))
    }
}

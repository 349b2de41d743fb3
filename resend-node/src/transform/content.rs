//! Template-or-HTML content selection for emails and broadcasts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::helpers::{non_empty, repeated, template_variables, KeyValuePair};

/// Content fields shared by Send Email and Create/Update Broadcast.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentFields {
    pub use_template: bool,
    pub template_id: String,
    #[serde(deserialize_with = "repeated")]
    pub template_variables: Vec<KeyValuePair>,
    pub html: String,
    pub text: String,
}

/// Reference to a stored template plus its variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateRef {
    pub id: String,
    pub variables: Map<String, Value>,
}

/// Message content, flattened into the request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Template {
        template: TemplateRef,
    },
    Inline {
        #[serde(skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl Content {
    pub fn is_template(&self) -> bool {
        matches!(self, Content::Template { .. })
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Content::Inline { subject, .. } => subject.as_deref(),
            Content::Template { .. } => None,
        }
    }
}

/// How the content block is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Full body. `html` is always present when not using a template;
    /// `subject` is carried only when `include_subject` is set.
    Create { include_subject: bool },
    /// Partial update: only non-empty fields are carried.
    Update,
}

/// Choose between `{template: {id, variables}}` and `{subject?, html, text?}`.
pub fn select_content(fields: &ContentFields, subject: &str, mode: ContentMode) -> Content {
    match mode {
        ContentMode::Create { include_subject } => {
            if fields.use_template {
                return template_content(fields);
            }
            Content::Inline {
                subject: if include_subject {
                    Some(subject.to_string())
                } else {
                    None
                },
                html: Some(fields.html.clone()),
                text: non_empty(&fields.text),
            }
        }
        ContentMode::Update => {
            if fields.use_template && !fields.template_id.is_empty() {
                return template_content(fields);
            }
            Content::Inline {
                subject: None,
                html: non_empty(&fields.html),
                text: non_empty(&fields.text),
            }
        }
    }
}

fn template_content(fields: &ContentFields) -> Content {
    Content::Template {
        template: TemplateRef {
            id: fields.template_id.clone(),
            variables: template_variables(&fields.template_variables),
        },
    }
}

//! Template lookups. Templates are read-only from here.

use reqwest::Method;
use serde::Deserialize;

use super::pagination::{prepare_pagination, PaginationFields};
use super::{require_id, ApiRequest, IdFields};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum TemplateOperation {
    List(PaginationFields),
    /// `id` accepts a template id or its alias.
    Get(IdFields),
}

impl TemplateOperation {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateOperation::List(_) => "list",
            TemplateOperation::Get(_) => "get",
        }
    }

    pub fn build(&self) -> Result<ApiRequest> {
        match self {
            TemplateOperation::List(fields) => Ok(ApiRequest::new(Method::GET, &["templates"])
                .with_query(prepare_pagination(fields))),
            TemplateOperation::Get(fields) => {
                let id = require_id(&fields.id, "Template ID or alias")?;
                Ok(ApiRequest::new(Method::GET, &["templates", id]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_by_alias() {
        let op: TemplateOperation =
            serde_json::from_value(json!({"operation": "get", "id": "welcome-email"})).unwrap();
        let request = op.build().unwrap();

        assert_eq!(op.name(), "get");
        assert_eq!(request.path(), "/templates/welcome-email");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_list_defaults() {
        let op: TemplateOperation = serde_json::from_value(json!({"operation": "list"})).unwrap();
        let request = op.build().unwrap();
        assert_eq!(request.query.unwrap().limit, 20);
    }
}

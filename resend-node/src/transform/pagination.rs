//! Cursor pagination shared by every list operation.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Pagination parameters from the field bag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaginationFields {
    #[serde(deserialize_with = "lenient_limit")]
    pub limit: Option<u32>,
    pub after: String,
    pub before: String,
}

/// Number fields can arrive as floats (`10.0`) or numeric strings; the
/// fractional part is dropped. Negative values become 0 and are clamped later.
fn lenient_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(Some(n.trunc().clamp(0.0, u32::MAX as f64) as u32)),
        _ => Err(de::Error::custom("limit must be a number")),
    }
}

/// Query string for a list request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationQuery {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

/// Build the list query: `limit` always (defaulted, clamped to 1..=100),
/// cursors only when set.
pub fn prepare_pagination(fields: &PaginationFields) -> PaginationQuery {
    PaginationQuery {
        limit: fields.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        after: Some(fields.after.clone()).filter(|c| !c.is_empty()),
        before: Some(fields.before.clone()).filter(|c| !c.is_empty()),
    }
}

//! Shared field transforms used by several resources.

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Split a comma-separated address list.
///
/// Segments are trimmed and empty ones dropped; order is preserved.
pub fn split_emails(emails: &str) -> Vec<String> {
    emails
        .split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}

/// `split_emails`, or `None` when the input holds no addresses.
pub(crate) fn optional_emails(emails: &str) -> Option<Vec<String>> {
    Some(split_emails(emails)).filter(|list| !list.is_empty())
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

/// One `{key, value}` entry of a repeated field group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyValuePair {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
}

impl KeyValuePair {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value.to_string()),
        }
    }

    fn entry(&self) -> Option<(&str, &str)> {
        match (&self.key, &self.value) {
            (key, Some(value)) if !key.is_empty() => Some((key.as_str(), value.as_str())),
            _ => None,
        }
    }
}

/// Flatten `{key, value}` pairs into a map.
///
/// Entries with an empty key or no value are skipped. Returns `None` instead
/// of an empty map so the caller can leave the field out of the body.
pub fn key_value_pairs_to_object(pairs: &[KeyValuePair]) -> Option<BTreeMap<String, String>> {
    let map: BTreeMap<String, String> = pairs
        .iter()
        .filter_map(KeyValuePair::entry)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Some(map).filter(|m| !m.is_empty())
}

/// Interpret a string as a number when it is one.
///
/// Empty strings and anything that does not parse to a finite number are
/// kept as strings. Integral values become JSON integers.
pub fn coerce_number(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(raw.to_string());
    }

    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }

    match trimmed.parse::<f64>() {
        Ok(float) if float.is_finite() => {
            if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
                Value::Number((float as i64).into())
            } else {
                Number::from_f64(float)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(raw.to_string()))
            }
        }
        _ => Value::String(raw.to_string()),
    }
}

/// Template variables with numeric coercion applied to each value.
///
/// Always returns a map (possibly empty): the template object carries a
/// `variables` key even when no variable was given.
pub fn template_variables(variables: &[KeyValuePair]) -> Map<String, Value> {
    variables
        .iter()
        .filter_map(KeyValuePair::entry)
        .map(|(k, v)| (k.to_string(), coerce_number(v)))
        .collect()
}

/// Declared type of a contact property value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    String,
    Number,
}

/// One custom contact property.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContactProperty {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: PropertyType,
}

/// Contact properties keyed by name; `None` when nothing survives.
///
/// A `number` property is coerced with [`coerce_number`] (and stays a string
/// when it does not parse); a `string` property is never coerced.
pub fn contact_properties(properties: &[ContactProperty]) -> Option<Map<String, Value>> {
    let map: Map<String, Value> = properties
        .iter()
        .filter(|p| !p.key.is_empty())
        .filter_map(|p| {
            let value = p.value.as_deref()?;
            let value = match p.kind {
                PropertyType::Number => coerce_number(value),
                PropertyType::String => Value::String(value.to_string()),
            };
            Some((p.key.clone(), value))
        })
        .collect();

    Some(map).filter(|m| !m.is_empty())
}

/// Email tag as sent to the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailTag {
    pub name: String,
    pub value: String,
}

/// Tag entry from the field bag. `key` is accepted for `name`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TagEntry {
    #[serde(default, alias = "key")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
}

pub fn email_tags(entries: &[TagEntry]) -> Option<Vec<EmailTag>> {
    let tags: Vec<EmailTag> = entries
        .iter()
        .filter(|t| !t.name.is_empty())
        .filter_map(|t| {
            Some(EmailTag {
                name: t.name.clone(),
                value: t.value.clone()?,
            })
        })
        .collect();

    Some(tags).filter(|t| !t.is_empty())
}

/// Accept a string, number or boolean and keep it as text.
///
/// Host field bags are loosely typed: a value typed as `42` arrives as a JSON
/// number, the same value typed as `"42"` as a string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Read a repeated field group.
///
/// The host nests a group's entries under its item key
/// (`{"pair": [...]}` for headers, `{"email": [...]}` for batch emails);
/// a bare list is accepted too. Absent, null and `{}` mean no entries.
pub(crate) fn repeated<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(Value::Object(group)) => {
            let mut lists = group.into_iter();
            match (lists.next(), lists.next()) {
                (None, _) => return Ok(Vec::new()),
                (Some((_, Value::Array(entries))), None) => entries,
                (Some((_, Value::Null)), None) => return Ok(Vec::new()),
                _ => {
                    return Err(de::Error::custom(
                        "expected a list or a group with a single item key",
                    ))
                }
            }
        }
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected a list of entries, found {other}"
            )))
        }
    };

    entries
        .into_iter()
        .map(|entry| T::deserialize(entry).map_err(de::Error::custom))
        .collect()
}

/// Treat an absent, null or `""` option as unset.
///
/// Option pickers send `""` when nothing was chosen.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(value) => T::deserialize(value).map(Some).map_err(de::Error::custom),
    }
}

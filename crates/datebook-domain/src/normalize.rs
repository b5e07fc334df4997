//! Canonical forms for priority and time-of-day values.
//!
//! Every value that crosses the wire goes through these functions, so the
//! rest of the crate can assume `Option<i64>` priorities and trimmed,
//! non-empty time strings.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// A priority as it may arrive from a form field or a JSON payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriorityInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for PriorityInput {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PriorityInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PriorityInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Canonicalize a priority.
///
/// `None`, empty strings, non-numeric strings, and non-finite numbers all
/// yield `None`. Anything else is truncated toward zero.
pub fn normalize_priority<P: Into<PriorityInput>>(value: Option<P>) -> Option<i64> {
    match value?.into() {
        PriorityInput::Int(n) => Some(n),
        PriorityInput::Float(f) => truncate(f),
        PriorityInput::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => trimmed.parse::<f64>().ok().and_then(truncate),
            }
        }
    }
}

fn truncate(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i64::MAX is not exactly representable; stay strictly inside the range
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Trim a time-of-day string. Blank means "no time".
pub fn normalize_time(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a wire date, accepting a full timestamp by keeping its date part.
pub fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub(crate) fn deserialize_priority<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n.as_f64().and_then(truncate),
        },
        serde_json::Value::String(s) => normalize_priority(Some(s.as_str())),
        _ => None,
    }))
}

pub(crate) fn deserialize_time<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_time(raw.as_deref()))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

pub(crate) fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_wire_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'"))),
    }
}

pub(crate) fn deserialize_date_list<'de, D>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    raw.iter()
        .map(|s| {
            parse_wire_date(s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid origin date '{s}'")))
        })
        .collect()
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Coercion and normalisation shared by every entity.
//!
//! Values arrive either as typed JSON or as plain strings from `multipart/form-data`
//! parts, so booleans, integers and dates are accepted in both shapes.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate};
use serde::{de::Error as _, Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText {
    Int(i64),
    Text(String),
}

/// `"true"`/`"false"` (any case), `"1"`/`"0"` and checkbox `"on"`/`"off"`.
pub fn parse_bool_like(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

pub fn parse_int_like(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Accepts a calendar date (`2023-01-15`) or an RFC 3339 timestamp
/// (`2023-01-15T00:00:00.000Z`); timestamps keep their UTC date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc().date()))
}

pub fn bool_like<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match BoolOrText::deserialize(deserializer)? {
        BoolOrText::Bool(b) => Ok(b),
        BoolOrText::Text(s) => parse_bool_like(&s)
            .ok_or_else(|| D::Error::custom(format!("expected a boolean, got \"{s}\""))),
    }
}

pub fn optional_bool_like<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<BoolOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrText::Bool(b)) => Ok(Some(b)),
        Some(BoolOrText::Text(s)) => parse_bool_like(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a boolean, got \"{s}\""))),
    }
}

pub fn optional_int_like<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IntOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrText::Int(n)) => Ok(Some(n)),
        Some(IntOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IntOrText::Text(s)) => parse_int_like(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got \"{s}\""))),
    }
}

/// Treats an explicit `null` like an absent key, so required fields report a
/// validation error instead of a type error.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date \"{s}\""))),
    }
}

pub fn trim_required(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

pub fn trim_optional(value: &mut Option<String>) {
    if let Some(inner) = value.take() {
        let trimmed = inner.trim();
        if !trimmed.is_empty() {
            *value = Some(trimmed.to_string());
        }
    }
}

/// Trims every entry and drops blank ones. Order and duplicates are kept.
pub fn normalize_technologies(technologies: &mut Vec<String>) {
    *technologies = technologies
        .drain(..)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
}

/// Runs the derived validations and adds a `required` error for every
/// non-string value the caller could not supply (a date, a level).
pub fn check_entity<T: Validate>(
    entity: &T,
    missing: &[(&'static str, &'static str)],
) -> Result<(), AppError> {
    let mut errors = entity.validate().err().unwrap_or_else(ValidationErrors::new);
    for &(field, message) in missing {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed(message));
        errors.add(field, error);
    }
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

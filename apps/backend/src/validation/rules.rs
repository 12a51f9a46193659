//! Reusable field predicates shared by the entity validators.

use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::errors::domain::DomainError;

pub const NAME_MAX: usize = 128;
pub const LONG_NAME_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 4096;
pub const EMAIL_MAX: usize = 254;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// Trim, NFKC-normalize and lowercase an email for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Case-insensitive email equality after normalization.
pub fn emails_match(a: &str, b: &str) -> bool {
    normalize_email(a) == normalize_email(b)
}

pub fn required_str(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::required(field));
    }
    Ok(())
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::invalid_field(
            field,
            value,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Required, trimmed-non-empty and no longer than `max`.
pub fn name(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    required_str(field, value)?;
    max_len(field, value, max)
}

pub fn email(field: &str, value: &str) -> Result<(), DomainError> {
    required_str(field, value)?;
    max_len(field, value, EMAIL_MAX)?;
    if !EMAIL.is_match(value.trim()) {
        return Err(DomainError::invalid_field(
            field,
            value,
            "must be a valid email address",
        ));
    }
    Ok(())
}

/// Identifier fields must be present (non-nil).
pub fn required_id(field: &str, id: Uuid) -> Result<(), DomainError> {
    if id.is_nil() {
        return Err(DomainError::required(field));
    }
    Ok(())
}

pub fn optional_id(field: &str, id: Option<Uuid>) -> Result<(), DomainError> {
    match id {
        Some(id) => required_id(field, id),
        None => Ok(()),
    }
}

/// Parse a textual identifier, e.g. from a scanned payload.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DomainError::invalid_field(field, raw, "must be a valid UUID"))
}

pub fn non_negative(field: &str, value: impl Into<i64>) -> Result<(), DomainError> {
    let value = value.into();
    if value < 0 {
        return Err(DomainError::invalid_field(
            field,
            value,
            "must be zero or greater",
        ));
    }
    Ok(())
}

pub fn positive(field: &str, value: impl Into<i64>) -> Result<(), DomainError> {
    let value = value.into();
    if value <= 0 {
        return Err(DomainError::invalid_field(
            field,
            value,
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Reject a change to a field that is fixed after creation.
pub fn immutable<V: PartialEq + Display>(field: &str, curr: &V, next: &V) -> Result<(), DomainError> {
    if curr != next {
        return Err(DomainError::invalid_field(
            field,
            next,
            "cannot be changed once set",
        ));
    }
    Ok(())
}

pub fn immutable_id(field: &str, curr: Uuid, next: Uuid) -> Result<(), DomainError> {
    immutable(field, &curr, &next)
}

//! Domain-level error type used across validators, repositories and services.
//!
//! This error type is transport- and DB-agnostic. Repository failures are
//! translated into it by `crate::infra::db_errors::map_db_err`; callers match
//! on the variant, never on the message.

use thiserror::Error;

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    /// Row lock not available or store unreachable; the caller may retry.
    Unavailable,
    Timeout,
    DataCorruption,
    Internal,
}

/// Conflict kinds mapped from integrity constraint names
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    UniqueAccountEmail,
    UniqueAccountUserEmail,
    UniqueSubscriptionInstance,
    UniqueInstanceParameter,
    ForeignKey(String),
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Client-supplied data violates a validation or business rule
    #[error("invalid data: {reason}")]
    InvalidData {
        field: Option<String>,
        value: Option<String>,
        reason: String,
    },
    /// A required field was missing or empty
    #[error("required field: {field}")]
    RequiredField { field: String },
    /// The record does not exist (after row-level security)
    #[error("not found: {table} {id}")]
    NotFound { table: &'static str, id: String },
    /// Unique or integrity violation
    #[error("conflict {0:?}: {1}")]
    Conflict(ConflictKind, String),
    /// Infrastructure/operational failures
    #[error("infra {0:?}: {1}")]
    Infra(InfraErrorKind, String),
}

impl DomainError {
    /// Invalid data with a reason only.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: None,
            value: None,
            reason: reason.into(),
        }
    }

    /// Invalid data attributed to a field and the offending value.
    pub fn invalid_field(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidData {
            field: Some(field.into()),
            value: Some(value.to_string()),
            reason: reason.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    pub fn not_found(table: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            table,
            id: id.to_string(),
        }
    }

    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }

    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Infra(InfraErrorKind::Unavailable, detail.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Infra(InfraErrorKind::Internal, detail.into())
    }

    /// True for lock contention and timeouts; the operation may be retried.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Infra(InfraErrorKind::Unavailable | InfraErrorKind::Timeout, _)
        )
    }

    /// True for client data errors, including missing required fields.
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, Self::InvalidData { .. } | Self::RequiredField { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The validation reason, when this is an `InvalidData` error.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::InvalidData { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The offending field, when known.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidData { field, .. } => field.as_deref(),
            Self::RequiredField { field } => Some(field),
            _ => None,
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        crate::infra::db_errors::map_db_err(e)
    }
}

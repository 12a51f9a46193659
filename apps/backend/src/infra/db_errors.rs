//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return raw `sea_orm::DbErr`; the repository facade converts it
//! here. Raw driver text is logged (redacted) and never handed to callers.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::logging::pii::Redacted;

/// Quoted identifier in a driver message, e.g. `violates unique constraint "ux_account_email"`.
static QUOTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#""([^"]+)""#).unwrap()
});

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Extract the quoted constraint name from a driver error message.
pub fn extract_constraint_name(error_msg: &str) -> Option<&str> {
    QUOTED_NAME
        .captures(error_msg)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract table.column from SQLite "UNIQUE constraint failed: table.column" error messages.
fn extract_sqlite_table_column(error_msg: &str) -> Option<&str> {
    let prefix = "UNIQUE constraint failed: ";
    let start = error_msg.find(prefix)? + prefix.len();
    error_msg[start..].split([' ', '\n', ',']).next()
}

/// Map named unique constraints to domain conflicts.
fn map_constraint_to_conflict(name: &str) -> Option<(ConflictKind, &'static str)> {
    match name {
        "ux_account_email" => Some((ConflictKind::UniqueAccountEmail, "Account email already registered")),
        "ux_account_user_email" => Some((
            ConflictKind::UniqueAccountUserEmail,
            "Account user email already registered",
        )),
        "ux_game_subscription_instance_link" => Some((
            ConflictKind::UniqueSubscriptionInstance,
            "Subscription is already assigned to this game instance",
        )),
        "ux_game_instance_parameter_key" => Some((
            ConflictKind::UniqueInstanceParameter,
            "Parameter already set for this game instance",
        )),
        _ => None,
    }
}

/// SQLite reports `table.column` instead of a constraint name.
fn map_sqlite_table_column_to_conflict(table_column: &str) -> Option<(ConflictKind, &'static str)> {
    match table_column {
        "account.email" => map_constraint_to_conflict("ux_account_email"),
        "account_user.email" => map_constraint_to_conflict("ux_account_user_email"),
        "game_subscription_instance.game_subscription_id"
        | "game_subscription_instance.game_instance_id" => {
            map_constraint_to_conflict("ux_game_subscription_instance_link")
        }
        "game_instance_parameter.game_instance_id" | "game_instance_parameter.parameter_key" => {
            map_constraint_to_conflict("ux_game_instance_parameter_key")
        }
        _ => None,
    }
}

/// Translate a `DbErr` into a `DomainError` with sanitized, PII-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(detail) => {
            return DomainError::not_found("record", detail.clone());
        }
        sea_orm::DbErr::RecordNotUpdated => {
            return DomainError::not_found("record", "no row updated");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::unavailable("Database unavailable");
        }
        _ => {}
    }

    // FOR UPDATE NOWAIT contention surfaces immediately instead of blocking
    if mentions_sqlstate(&error_msg, "55P03")
        || error_msg.contains("could not obtain lock")
        || error_msg.contains("database is locked")
    {
        warn!(raw_error = %Redacted(&error_msg), "Row lock not available");
        return DomainError::unavailable("Record is locked by another operation; retry later");
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %Redacted(&error_msg), "Unique constraint violation");

        if let Some(table_column) = extract_sqlite_table_column(&error_msg) {
            if let Some((kind, detail)) = map_sqlite_table_column_to_conflict(table_column) {
                return DomainError::conflict(kind, detail);
            }
            return DomainError::conflict(
                ConflictKind::Other(table_column.to_string()),
                "Unique constraint violation",
            );
        }

        if let Some(name) = extract_constraint_name(&error_msg) {
            if let Some((kind, detail)) = map_constraint_to_conflict(name) {
                return DomainError::conflict(kind, detail);
            }
            return DomainError::conflict(
                ConflictKind::Other(name.to_string()),
                "Unique constraint violation",
            );
        }

        return DomainError::conflict(
            ConflictKind::Other("unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        let name = extract_constraint_name(&error_msg).unwrap_or("foreign_key");
        return DomainError::conflict(
            ConflictKind::ForeignKey(name.to_string()),
            "Referenced record does not exist or is still referenced",
        );
    }

    if mentions_sqlstate(&error_msg, "23514") || error_msg.contains("CHECK constraint failed") {
        warn!(raw_error = %Redacted(&error_msg), "Check constraint violation");
        let name = extract_constraint_name(&error_msg).unwrap_or("check");
        return DomainError::InvalidData {
            field: None,
            value: None,
            reason: format!("check constraint {name} violated"),
        };
    }

    if error_msg.contains("timeout") || error_msg.contains("timed out") {
        warn!(raw_error = %Redacted(&error_msg), "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::internal("Database operation failed")
}

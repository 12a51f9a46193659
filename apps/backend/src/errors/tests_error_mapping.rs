// Unit tests for the domain error taxonomy - no database involved
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};

#[test]
fn invalid_field_carries_field_value_and_reason() {
    let err = DomainError::invalid_field("health", -1, "must be zero or greater");
    assert!(err.is_invalid_data());
    assert_eq!(err.field(), Some("health"));
    assert_eq!(err.reason(), Some("must be zero or greater"));
    match err {
        DomainError::InvalidData { value, .. } => assert_eq!(value.as_deref(), Some("-1")),
        other => panic!("expected InvalidData, got {other:?}"),
    }
}

#[test]
fn required_field_is_a_kind_of_invalid_data() {
    let err = DomainError::required("name");
    assert!(err.is_invalid_data());
    assert_eq!(err.field(), Some("name"));
    assert_eq!(err.reason(), None);
    assert_eq!(err.to_string(), "required field: name");
}

#[test]
fn not_found_names_table_and_id() {
    let err = DomainError::not_found("game", "abc");
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "not found: game abc");
}

#[test]
fn unavailable_covers_lock_and_timeout() {
    assert!(DomainError::unavailable("locked").is_unavailable());
    assert!(DomainError::infra(InfraErrorKind::Timeout, "slow").is_unavailable());
    assert!(!DomainError::internal("boom").is_unavailable());
    assert!(!DomainError::conflict(ConflictKind::UniqueAccountEmail, "dup").is_unavailable());
}

#![allow(dead_code)]

// tests/common/mod.rs
use pbm_backend::DomainError;

// Logging is auto-installed for most test binaries
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

// Policy defaults to rollback but can be flipped per-binary via `PBM_TXN_POLICY=commit`.
#[ctor::ctor]
fn init_txn_policy() {
    let policy = match std::env::var("PBM_TXN_POLICY")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "commit" => pbm_backend::db::txn_policy::TxnPolicy::CommitOnOk,
        _ => pbm_backend::db::txn_policy::TxnPolicy::RollbackOnOk,
    };

    pbm_backend::db::txn_policy::set_txn_policy(policy);
}

/// Assert an operation failed with invalid data carrying `reason`.
#[track_caller]
pub fn assert_invalid<T: std::fmt::Debug>(result: Result<T, DomainError>, reason: &str) {
    match result {
        Err(err) => {
            assert!(err.is_invalid_data(), "expected invalid data, got {err:?}");
            assert_eq!(err.reason(), Some(reason), "unexpected reason for {err:?}");
        }
        Ok(value) => panic!("expected `{reason}`, got Ok({value:?})"),
    }
}

/// Like [`assert_invalid`] but only checks the reason's prefix.
#[track_caller]
pub fn assert_invalid_prefix<T: std::fmt::Debug>(result: Result<T, DomainError>, prefix: &str) {
    match result {
        Err(err) => {
            let reason = err.reason().unwrap_or_default().to_string();
            assert!(
                reason.starts_with(prefix),
                "expected reason starting with `{prefix}`, got {err:?}"
            );
        }
        Ok(value) => panic!("expected `{prefix}...`, got Ok({value:?})"),
    }
}

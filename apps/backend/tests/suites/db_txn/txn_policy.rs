//! The policy is a process-wide OnceLock; `common` has already set it.

use pbm_backend::db::txn_policy::{current, set_txn_policy, TxnPolicy};

#[test]
fn later_policy_changes_are_ignored() {
    assert_eq!(current(), TxnPolicy::RollbackOnOk);
    set_txn_policy(TxnPolicy::CommitOnOk);
    assert_eq!(current(), TxnPolicy::RollbackOnOk);
}

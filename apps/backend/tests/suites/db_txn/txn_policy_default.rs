//! Default commit policy behavior.
//!
//! Runs without `mod common`, so the OnceLock is empty and `with_txn` commits.

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

use pbm_backend::adapters::records_sea::{Lock, QueryOptions};
use pbm_backend::db::txn_policy::{current, TxnPolicy};
use pbm_backend::entities::account;
use pbm_backend::services::crud;
use pbm_backend::{with_txn, DomainError, Rls};

use crate::support::factory;
use crate::support::test_state::build_test_state;

#[tokio::test]
async fn committed_rows_are_visible_to_later_transactions() -> Result<(), DomainError> {
    assert_eq!(current(), TxnPolicy::CommitOnOk);
    let state = build_test_state().await?;

    let created = with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move { factory::create_account(&scope, "committed").await })
    })
    .await?;

    let id = created.id;
    let seen = with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let found = scope
                .repo::<account::Entity>()
                .get_one(id, Lock::None)
                .await?;
            // Clean up so Postgres runs stay repeatable
            crud::remove::<account::Entity>(&scope, id).await?;
            Ok(found)
        })
    })
    .await?;
    assert_eq!(seen.email, created.email);

    let email = created.email.clone();
    let left = with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            scope
                .repo::<account::Entity>()
                .count(&QueryOptions::new().eq("email", email).including_deleted())
                .await
        })
    })
    .await?;
    assert_eq!(left, 0);

    Ok(())
}

// Rollback policy: nothing written inside `with_txn` survives it.

use pbm_backend::adapters::records_sea::QueryOptions;
use pbm_backend::db::txn_policy::{current, TxnPolicy};
use pbm_backend::entities::account;
use pbm_backend::{with_txn, AppState, DomainError, Rls};
use tracing::debug;

use crate::support::factory;
use crate::support::test_state::build_test_state;

async fn count_accounts(state: &AppState, email: &str) -> Result<u64, DomainError> {
    let email = email.to_string();
    with_txn(state, Rls::new(), |scope| {
        Box::pin(async move {
            scope
                .repo::<account::Entity>()
                .count(&QueryOptions::new().eq("email", email).including_deleted())
                .await
        })
    })
    .await
}

#[tokio::test]
async fn successful_body_is_rolled_back() -> Result<(), DomainError> {
    assert_eq!(current(), TxnPolicy::RollbackOnOk);
    let state = build_test_state().await?;

    let email = with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let account = factory::create_account(&scope, "rollback").await?;
            debug!(account_id = %account.id, "inserted account inside txn");
            Ok(account.email)
        })
    })
    .await?;

    assert_eq!(count_accounts(&state, &email).await?, 0);
    Ok(())
}

#[tokio::test]
async fn failing_body_is_rolled_back_and_keeps_its_error() -> Result<(), DomainError> {
    let state = build_test_state().await?;
    let (tx, rx) = std::sync::mpsc::channel();

    let result: Result<(), DomainError> = with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let account = factory::create_account(&scope, "doomed").await?;
            let _ = tx.send(account.email);
            Err(DomainError::invalid("body gave up"))
        })
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.reason(), Some("body gave up"));

    let email = rx.recv().expect("account email sent before failing");
    assert_eq!(count_accounts(&state, &email).await?, 0);
    Ok(())
}

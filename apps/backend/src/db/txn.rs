use std::future::Future;
use std::pin::Pin;

use sea_orm::TransactionTrait;
use tracing::warn;

use super::txn_policy;
use crate::errors::domain::DomainError;
use crate::repos::{Rls, Scope};
use crate::state::app_state::AppState;

/// Boxed future returned by a [`with_txn`] body, borrowing the scope's transaction.
pub type ScopedFuture<'a, R> = Pin<Box<dyn Future<Output = Result<R, DomainError>> + Send + 'a>>;

/// Execute a function within a database transaction.
///
/// Begins a transaction, hands the body a [`Scope`] carrying `rls`, then applies
/// the transaction policy on Ok and rolls back on Err.
pub async fn with_txn<R, F>(state: &AppState, rls: Rls, f: F) -> Result<R, DomainError>
where
    F: for<'a> FnOnce(Scope<'a>) -> ScopedFuture<'a, R>,
{
    let txn = state.db.begin().await?;
    let scope = Scope::new(&txn, &state.config).with_rls(rls);
    let out = f(scope).await;

    match out {
        Ok(val) => match txn_policy::current() {
            txn_policy::TxnPolicy::CommitOnOk => {
                txn.commit().await?;
                Ok(val)
            }
            txn_policy::TxnPolicy::RollbackOnOk => {
                txn.rollback().await?;
                Ok(val)
            }
        },
        Err(err) => {
            // Best-effort rollback; preserve original error
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

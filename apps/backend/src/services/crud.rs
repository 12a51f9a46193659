//! Generic lifecycle orchestration.
//!
//! Every entity mutation runs the same pipeline: lock the current row (for
//! update/delete), run the validator descriptor, run the entity's async hooks,
//! then hand the record to the repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, IntoActiveModel};
use tracing::debug;
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::errors::domain::DomainError;
use crate::repos::{Record, Scope};
use crate::validation::{self, Validated};

/// Cross-row rules an entity needs checked against the store.
///
/// Hooks run after the pure validators and inside the caller's transaction.
#[async_trait]
pub trait Lifecycle: Record + Validated {
    async fn before_create(&self, _scope: &Scope<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    /// Called on the current row with the proposed replacement.
    async fn before_update(&self, _next: &Self, _scope: &Scope<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    async fn before_delete(&self, _scope: &Scope<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    /// Physical removal is refused while live rows still reference the record.
    async fn before_remove(&self, _scope: &Scope<'_>) -> Result<(), DomainError> {
        Ok(())
    }
}

pub async fn get_one<E>(scope: &Scope<'_>, id: Uuid) -> Result<E::Model, DomainError>
where
    E: EntityTrait,
    E::Model: Lifecycle + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    scope.repo::<E>().get_one(id, Lock::None).await
}

pub async fn get_many<E>(
    scope: &Scope<'_>,
    options: &QueryOptions,
) -> Result<Vec<E::Model>, DomainError>
where
    E: EntityTrait,
    E::Model: Lifecycle + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    scope.repo::<E>().get_many(options).await
}

pub async fn create<E>(scope: &Scope<'_>, mut rec: E::Model) -> Result<E::Model, DomainError>
where
    E: EntityTrait,
    E::Model: Lifecycle + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    if rec.id().is_nil() {
        rec.set_id(Uuid::new_v4());
    }
    rec.set_deleted_at(None);
    validation::validate_for_create(&rec)?;
    rec.before_create(scope).await?;
    let created = scope.repo::<E>().create_one(rec).await?;
    let table = <E::Model as Record>::TABLE;
    debug!(table, id = %created.id(), "Record created");
    Ok(created)
}

/// Replace the live row with `next`, locking the current row without waiting.
///
/// Audit columns are carried over from the stored row.
pub async fn update<E>(scope: &Scope<'_>, mut next: E::Model) -> Result<E::Model, DomainError>
where
    E: EntityTrait,
    E::Model: Lifecycle + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    let repo = scope.repo::<E>();
    let curr = repo.get_one(next.id(), Lock::ForUpdateNoWait).await?;
    next.set_created_at(curr.created_at());
    next.set_deleted_at(curr.deleted_at());
    validation::validate_for_update(&curr, &next)?;
    curr.before_update(&next, scope).await?;
    repo.update_one(next).await
}

/// Soft delete.
pub async fn delete<E>(scope: &Scope<'_>, id: Uuid) -> Result<(), DomainError>
where
    E: EntityTrait,
    E::Model: Lifecycle + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    let repo = scope.repo::<E>();
    let curr = repo.get_one(id, Lock::ForUpdateNoWait).await?;
    validation::validate_for_delete(&curr)?;
    curr.before_delete(scope).await?;
    repo.delete_one(id).await
}

/// Physical removal. Soft-deleted rows can be removed too.
pub async fn remove<E>(scope: &Scope<'_>, id: Uuid) -> Result<(), DomainError>
where
    E: EntityTrait,
    E::Model: Lifecycle + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    let repo = scope.repo::<E>();
    let curr = repo
        .first(
            QueryOptions::new()
                .eq("id", id)
                .including_deleted()
                .with_lock(Lock::ForUpdateNoWait),
        )
        .await?
        .ok_or_else(|| DomainError::not_found(<E::Model as Record>::TABLE, id))?;
    curr.before_remove(scope).await?;
    repo.remove_one(id).await
}

/// Fails when any live `C` row has `column = id`. Ignores RLS.
pub async fn ensure_no_live_children<C>(
    scope: &Scope<'_>,
    column: &'static str,
    id: Uuid,
) -> Result<(), DomainError>
where
    C: EntityTrait,
    C::Model: Record + IntoActiveModel<C::ActiveModel>,
    C::ActiveModel: ActiveModelTrait<Entity = C> + ActiveModelBehavior + Send,
{
    let live = scope
        .unrestricted()
        .repo::<C>()
        .count(&QueryOptions::new().eq(column, id))
        .await?;
    if live > 0 {
        return Err(DomainError::invalid_field(
            "id",
            id,
            format!(
                "cannot remove: {live} {} record(s) still reference it",
                <C::Model as Record>::TABLE
            ),
        ));
    }
    Ok(())
}

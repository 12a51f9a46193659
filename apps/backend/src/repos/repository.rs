//! Generic record store facade over `adapters::records_sea`.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, DbErr,
    EntityTrait, IntoActiveModel,
};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::adapters::records_sea::{self as records, Lock, QueryOptions};
use crate::errors::domain::DomainError;
use crate::repos::record::Record;
use crate::repos::rls::Rls;

/// Per-entity repository bound to one transaction and one set of RLS identifiers.
///
/// Reads exclude soft-deleted rows unless the options ask for them, and every
/// statement is narrowed by the RLS predicates.
pub struct Repository<'a, E> {
    conn: &'a DatabaseTransaction,
    rls: Rls,
    _entity: PhantomData<E>,
}

impl<'a, E> Repository<'a, E>
where
    E: EntityTrait,
    E::Model: Record + IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    pub fn new(conn: &'a DatabaseTransaction) -> Self {
        Self {
            conn,
            rls: Rls::default(),
            _entity: PhantomData,
        }
    }

    /// Replace the RLS identifiers applied to every statement.
    pub fn with_rls(mut self, rls: Rls) -> Self {
        self.rls = rls;
        self
    }

    pub fn table(&self) -> &'static str {
        <E::Model as Record>::TABLE
    }

    fn rls_condition(&self) -> Result<Condition, DbErr> {
        let mut cond = Condition::all();
        for (name, ids) in self.rls.constraints_for(self.table()) {
            if !records::has_column::<E>(&name) {
                continue;
            }
            cond = cond.add(records::column::<E>(&name)?.is_in(ids));
        }
        Ok(cond)
    }

    fn live_condition(&self, include_deleted: bool) -> Result<Condition, DbErr> {
        let mut cond = self.rls_condition()?;
        if !include_deleted {
            cond = cond.add(records::column::<E>("deleted_at")?.is_null());
        }
        Ok(cond)
    }

    fn id_condition(&self, id: Uuid) -> Result<Condition, DbErr> {
        Ok(self
            .live_condition(false)?
            .add(records::column::<E>("id")?.eq(id)))
    }

    /// Fetch a live row by id, or `NotFound`.
    ///
    /// With `Lock::ForUpdateNoWait` a contended row fails fast as `Unavailable`.
    pub async fn get_one(&self, id: Uuid, lock: Lock) -> Result<E::Model, DomainError> {
        self.find_one(id, lock)
            .await?
            .ok_or_else(|| DomainError::not_found(self.table(), id))
    }

    pub async fn find_one(&self, id: Uuid, lock: Lock) -> Result<Option<E::Model>, DomainError> {
        let cond = self.id_condition(id)?;
        Ok(records::find_one::<_, E>(self.conn, cond, lock).await?)
    }

    pub async fn get_many(&self, options: &QueryOptions) -> Result<Vec<E::Model>, DomainError> {
        let cond = self
            .live_condition(options.include_deleted)?
            .add(records::params_condition::<E>(&options.params)?);
        Ok(records::find_many::<_, E>(
            self.conn,
            cond,
            &options.sort,
            options.limit,
            options.lock,
        )
        .await?)
    }

    /// First row of `get_many` (limit 1), if any.
    pub async fn first(&self, options: QueryOptions) -> Result<Option<E::Model>, DomainError> {
        Ok(self
            .get_many(&options.with_limit(1))
            .await?
            .into_iter()
            .next())
    }

    pub async fn count(&self, options: &QueryOptions) -> Result<u64, DomainError>
    where
        E::Model: Sync,
    {
        let cond = self
            .live_condition(options.include_deleted)?
            .add(records::params_condition::<E>(&options.params)?);
        Ok(records::count::<_, E>(self.conn, cond).await?)
    }

    /// Insert a new row. A nil id is replaced with a fresh v4 id; `created_at` is stamped.
    pub async fn create_one(&self, mut rec: E::Model) -> Result<E::Model, DomainError> {
        if rec.id().is_nil() {
            rec.set_id(Uuid::new_v4());
        }
        rec.set_created_at(OffsetDateTime::now_utc());
        rec.set_updated_at(None);
        Ok(records::insert::<_, E>(self.conn, rec).await?)
    }

    /// Write every column of `rec` back, stamping `updated_at`.
    pub async fn update_one(&self, mut rec: E::Model) -> Result<E::Model, DomainError>
    where
        E::Model: Sync,
    {
        let id = rec.id();
        if !self.rls.is_empty() {
            let visible = records::count::<_, E>(self.conn, self.id_condition(id)?).await?;
            if visible == 0 {
                return Err(DomainError::not_found(self.table(), id));
            }
        }
        rec.set_updated_at(Some(OffsetDateTime::now_utc()));
        match records::update::<_, E>(self.conn, rec).await {
            Ok(updated) => Ok(updated),
            Err(DbErr::RecordNotUpdated) => Err(DomainError::not_found(self.table(), id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Soft delete: stamps `deleted_at`. Already-deleted rows are `NotFound`.
    pub async fn delete_one(&self, id: Uuid) -> Result<(), DomainError> {
        let affected =
            records::soft_delete::<_, E>(self.conn, self.id_condition(id)?, OffsetDateTime::now_utc())
                .await?;
        if affected == 0 {
            return Err(DomainError::not_found(self.table(), id));
        }
        debug!(table = self.table(), %id, "Record soft-deleted");
        Ok(())
    }

    /// Physical removal; soft-deleted rows may be removed too.
    pub async fn remove_one(&self, id: Uuid) -> Result<(), DomainError> {
        let cond = self
            .live_condition(true)?
            .add(records::column::<E>("id")?.eq(id));
        let affected = records::hard_delete::<_, E>(self.conn, cond).await?;
        if affected == 0 {
            return Err(DomainError::not_found(self.table(), id));
        }
        debug!(table = self.table(), %id, "Record removed");
        Ok(())
    }
}

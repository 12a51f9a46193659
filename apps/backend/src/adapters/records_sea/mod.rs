//! SeaORM adapter for the generic record store - generic over ConnectionTrait.
//!
//! Columns are resolved by name through the entity's `Column: FromStr`, so one
//! set of functions serves every table. Adapter functions return DbErr; the
//! repository facade maps to DomainError via From<DbErr>.

use std::str::FromStr;

use sea_orm::sea_query::{Expr, LockBehavior, LockType};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseBackend, DbErr, EntityName, EntityTrait, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use time::OffsetDateTime;

pub mod dto;

pub use dto::{Lock, Op, Param, QueryOptions};

/// Resolve a column by its snake_case name.
pub fn column<E: EntityTrait>(name: &str) -> Result<E::Column, DbErr> {
    E::Column::from_str(name).map_err(|_| {
        DbErr::Custom(format!(
            "unknown column {name} on {}",
            E::default().table_name()
        ))
    })
}

pub fn has_column<E: EntityTrait>(name: &str) -> bool {
    E::Column::from_str(name).is_ok()
}

/// AND-join `{column, op}` filters.
pub fn params_condition<E: EntityTrait>(params: &[Param]) -> Result<Condition, DbErr> {
    let mut cond = Condition::all();
    for param in params {
        let col = column::<E>(param.column)?;
        cond = cond.add(match &param.op {
            Op::Eq(v) => col.eq(v.clone()),
            Op::Ne(v) => col.ne(v.clone()),
            Op::Lte(v) => col.lte(v.clone()),
            Op::Gte(v) => col.gte(v.clone()),
            Op::In(vs) => col.is_in(vs.clone()),
            Op::IsNull => col.is_null(),
            Op::IsNotNull => col.is_not_null(),
        });
    }
    Ok(cond)
}

fn apply_lock<E: EntityTrait>(select: Select<E>, lock: Lock, backend: DatabaseBackend) -> Select<E> {
    // SQLite has no row locks; the single writer serialises transactions instead
    if backend == DatabaseBackend::Sqlite {
        return select;
    }
    match lock {
        Lock::None => select,
        Lock::ForUpdate => select.lock(LockType::Update),
        Lock::ForUpdateNoWait => select.lock_with_behavior(LockType::Update, LockBehavior::Nowait),
    }
}

pub async fn find_many<C, E>(
    conn: &C,
    cond: Condition,
    sort: &[(&'static str, Order)],
    limit: Option<u64>,
    lock: Lock,
) -> Result<Vec<E::Model>, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
{
    let mut select = E::find().filter(cond);
    if sort.is_empty() {
        select = select
            .order_by(column::<E>("created_at")?, Order::Asc)
            .order_by(column::<E>("id")?, Order::Asc);
    } else {
        for (name, order) in sort {
            select = select.order_by(column::<E>(name)?, order.clone());
        }
    }
    if let Some(n) = limit {
        select = select.limit(n);
    }
    apply_lock(select, lock, conn.get_database_backend())
        .all(conn)
        .await
}

pub async fn find_one<C, E>(conn: &C, cond: Condition, lock: Lock) -> Result<Option<E::Model>, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
{
    apply_lock(E::find().filter(cond), lock, conn.get_database_backend())
        .one(conn)
        .await
}

pub async fn count<C, E>(conn: &C, cond: Condition) -> Result<u64, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
    E::Model: Sync,
{
    E::find().filter(cond).count(conn).await
}

pub async fn insert<C, E>(conn: &C, model: E::Model) -> Result<E::Model, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    model.into_active_model().reset_all().insert(conn).await
}

/// Full-row update keyed by primary key; `RecordNotUpdated` when the row is gone.
pub async fn update<C, E>(conn: &C, model: E::Model) -> Result<E::Model, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    model.into_active_model().reset_all().update(conn).await
}

/// Stamp `deleted_at` on matching live rows. Returns rows affected.
pub async fn soft_delete<C, E>(conn: &C, cond: Condition, now: OffsetDateTime) -> Result<u64, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
{
    let deleted_at = column::<E>("deleted_at")?;
    let result = E::update_many()
        .col_expr(deleted_at, Expr::val(now).into())
        .col_expr(column::<E>("updated_at")?, Expr::val(now).into())
        .filter(cond)
        .filter(deleted_at.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn hard_delete<C, E>(conn: &C, cond: Condition) -> Result<u64, DbErr>
where
    C: ConnectionTrait + Send + Sync,
    E: EntityTrait,
{
    let result = E::delete_many().filter(cond).exec(conn).await?;
    Ok(result.rows_affected)
}

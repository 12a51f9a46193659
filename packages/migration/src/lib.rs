pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

mod m20260301_000001_pbm_core; // keep filename + module name in sync

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_pbm_core::Migration)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Status,
}

/// Run a migration command against an open connection.
/// Used by the backend's state builder.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let name = database_name(db).await?;
    tracing::info!(
        ?command,
        ?backend,
        database = %name,
        defined = Migrator::migrations().len(),
        applied = count_applied_migrations(db).await?,
        "Running migrations"
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            tracing::info!(
                ?command,
                database = %name,
                applied = count_applied_migrations(db).await?,
                "Migrations finished"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(?command, database = %name, error = %e, "Migrations failed");
            Err(e)
        }
    }
}

async fn database_name(db: &DatabaseConnection) -> Result<String, DbErr> {
    let backend = db.get_database_backend();
    let (sql, column) = match backend {
        DatabaseBackend::Postgres => ("select current_database() as name", "name"),
        DatabaseBackend::Sqlite => (
            "SELECT file FROM pragma_database_list WHERE name = 'main'",
            "file",
        ),
        _ => return Ok("<unsupported>".to_string()),
    };
    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await?;
    Ok(match row.and_then(|r| r.try_get::<String>("", column).ok()) {
        Some(file) if file.is_empty() => ":memory:".to_string(),
        Some(name) => name,
        None => "<unknown>".to_string(),
    })
}

/// Number of applied migrations; 0 before the bookkeeping table exists.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

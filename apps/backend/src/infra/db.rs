use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::{db_url, DbOwner, DbProfile};
use crate::errors::domain::DomainError;

/// Unified database connector that supports different profiles and owners.
/// This function does NOT run any migrations.
pub async fn connect_db(
    profile: DbProfile,
    owner: DbOwner,
) -> Result<DatabaseConnection, DomainError> {
    let database_url = db_url(profile.clone(), owner)?;

    let mut options = ConnectOptions::new(database_url);
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if profile == DbProfile::SqliteMemory {
        // every pooled connection would otherwise see its own empty database
        options.max_connections(1).min_connections(1);
    }

    let conn = Database::connect(options).await?;
    info!(?profile, backend = ?conn.get_database_backend(), "Database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn connect_and_migrate(
    profile: DbProfile,
    owner: DbOwner,
) -> Result<DatabaseConnection, DomainError> {
    let conn = connect_db(profile, owner).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    Ok(conn)
}

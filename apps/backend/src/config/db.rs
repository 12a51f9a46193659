use std::env;

use crate::errors::domain::DomainError;

/// Database profile enum for different environments
#[derive(Debug, Clone, PartialEq)]
pub enum DbProfile {
    /// Production Postgres database
    Prod,
    /// Test Postgres database - enforces safety rules
    Test,
    /// Private in-memory SQLite database (unit/integration tests, local runs)
    SqliteMemory,
}

/// Database owner enum for different access levels
#[derive(Debug, Clone, PartialEq)]
pub enum DbOwner {
    /// Application-level access (limited permissions)
    App,
    /// Owner-level access (full permissions for migrations)
    Owner,
}

/// Builds a database URL from environment variables based on profile and owner
pub fn db_url(profile: DbProfile, owner: DbOwner) -> Result<String, DomainError> {
    if profile == DbProfile::SqliteMemory {
        return Ok("sqlite::memory:".to_string());
    }

    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = db_name(&profile)?;
    let (username, password) = credentials(owner)?;

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

fn db_name(profile: &DbProfile) -> Result<String, DomainError> {
    match profile {
        DbProfile::Prod => must_var("PROD_DB"),
        DbProfile::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(DomainError::invalid_field(
                    "TEST_DB",
                    &db_name,
                    "test profile requires database name to end with '_test'",
                ));
            }
            Ok(db_name)
        }
        DbProfile::SqliteMemory => Ok(String::new()),
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DomainError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((must_var("PBM_OWNER_USER")?, must_var("PBM_OWNER_PASSWORD")?)),
    }
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, DomainError> {
    env::var(name).map_err(|_| DomainError::required(name))
}

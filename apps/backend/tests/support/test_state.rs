use std::env;

use pbm_backend::{build_state, AppState, DbProfile, DomainError, EngineConfig};

/// SQLite in memory unless `PBM_TEST_DB=postgres` selects the Postgres test database.
pub fn resolve_test_profile() -> DbProfile {
    match env::var("PBM_TEST_DB")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "postgres" | "pg" => DbProfile::Test,
        _ => DbProfile::SqliteMemory,
    }
}

pub async fn build_test_state() -> Result<AppState, DomainError> {
    build_test_state_with(EngineConfig::default()).await
}

pub async fn build_test_state_with(config: EngineConfig) -> Result<AppState, DomainError> {
    build_state()
        .with_db(resolve_test_profile())
        .with_config(config)
        .build()
        .await
}

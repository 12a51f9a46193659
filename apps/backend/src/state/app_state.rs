use sea_orm::DatabaseConnection;

use crate::config::engine::EngineConfig;

/// Shared resources handed to every domain operation entry point.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: EngineConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: EngineConfig) -> Self {
        Self { db, config }
    }
}

use crate::config::db::{DbOwner, DbProfile};
use crate::config::engine::EngineConfig;
use crate::errors::domain::DomainError;
use crate::infra::db::connect_and_migrate;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used by hosts and tests)
pub struct StateBuilder {
    config: Option<EngineConfig>,
    db_profile: Option<DbProfile>,
    db_owner: DbOwner,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            db_profile: None,
            db_owner: DbOwner::App,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = Some(profile);
        self
    }

    pub fn with_owner(mut self, owner: DbOwner) -> Self {
        self.db_owner = owner;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Connects, migrates and loads the engine config (from the environment unless supplied).
    pub async fn build(self) -> Result<AppState, DomainError> {
        let profile = self
            .db_profile
            .ok_or_else(|| DomainError::required("db_profile"))?;
        let config = match self.config {
            Some(config) => config,
            None => EngineConfig::from_env()?,
        };
        let conn = connect_and_migrate(profile, self.db_owner).await?;
        Ok(AppState::new(conn, config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

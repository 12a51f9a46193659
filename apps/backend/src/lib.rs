#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod errors;
pub mod infra;
pub mod logging;
pub mod repos;
pub mod services;
pub mod state;
pub mod validation;

// Re-exports for public API
pub use config::db::{db_url, DbOwner, DbProfile};
pub use config::engine::EngineConfig;
pub use db::txn::with_txn;
pub use errors::domain::DomainError;
pub use infra::db::{connect_and_migrate, connect_db};
pub use infra::state::build_state;
pub use repos::{Rls, Scope};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}

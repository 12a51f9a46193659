//! Infrastructure layer - database connections, state building and error translation.

pub mod db;
pub mod db_errors;
pub mod state;

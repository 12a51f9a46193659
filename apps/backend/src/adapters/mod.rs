//! Adapters for external dependencies.

pub mod records_sea;

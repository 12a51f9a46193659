//! Error handling for the play-by-mail backend.

pub mod domain;

#[cfg(test)]
mod tests_error_mapping;

pub use domain::{ConflictKind, DomainError, InfraErrorKind};

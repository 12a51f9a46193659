//! Validator runner.
//!
//! Each entity declares a [`Ruleset`] of plain functions; the runner applies
//! them in order and stops at the first failure.

use crate::errors::domain::DomainError;

pub mod accounts;
pub mod catalog;
pub mod images;
pub mod instances;
pub mod rules;
pub mod subscriptions;
pub mod turn_sheets;

pub type CreateRule<T> = fn(&T) -> Result<(), DomainError>;
pub type UpdateRule<T> = fn(&T, &T) -> Result<(), DomainError>;
pub type DeleteRule<T> = fn(&T) -> Result<(), DomainError>;

/// Rules for one entity. `updates` receive `(current, next)`.
pub struct Ruleset<T: 'static> {
    pub creates: &'static [CreateRule<T>],
    pub updates: &'static [UpdateRule<T>],
    pub deletes: &'static [DeleteRule<T>],
}

impl<T: 'static> Ruleset<T> {
    pub const EMPTY: Ruleset<T> = Ruleset {
        creates: &[],
        updates: &[],
        deletes: &[],
    };
}

/// Entity with a validator descriptor.
pub trait Validated: Sized + 'static {
    const RULES: Ruleset<Self>;
}

pub fn validate_for_create<T: Validated>(rec: &T) -> Result<(), DomainError> {
    for rule in T::RULES.creates {
        rule(rec)?;
    }
    Ok(())
}

/// Field rules are re-checked against `next` before the transition rules run.
pub fn validate_for_update<T: Validated>(curr: &T, next: &T) -> Result<(), DomainError> {
    validate_for_create(next)?;
    for rule in T::RULES.updates {
        rule(curr, next)?;
    }
    Ok(())
}

pub fn validate_for_delete<T: Validated>(rec: &T) -> Result<(), DomainError> {
    for rule in T::RULES.deletes {
        rule(rec)?;
    }
    Ok(())
}

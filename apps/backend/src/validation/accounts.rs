//! Account, account user, contact and platform subscription validators.
//!
//! `Account` (the tenant) and `AccountUser` (a member) are validated separately.

use super::rules::{self, NAME_MAX};
use super::{Ruleset, Validated};
use crate::entities::{
    account, account_contact, account_subscription, account_user, account_user_contact,
};
use crate::errors::domain::DomainError;

fn account_fields(rec: &account::Model) -> Result<(), DomainError> {
    rules::email("email", &rec.email)?;
    rules::name("name", &rec.name, NAME_MAX)
}

fn account_email_fixed(curr: &account::Model, next: &account::Model) -> Result<(), DomainError> {
    rules::immutable("email", &curr.email, &next.email)
}

impl Validated for account::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[account_fields],
        updates: &[account_email_fixed],
        deletes: &[],
    };
}

fn account_user_fields(rec: &account_user::Model) -> Result<(), DomainError> {
    rules::required_id("account_id", rec.account_id)?;
    rules::email("email", &rec.email)
}

fn account_user_fixed(
    curr: &account_user::Model,
    next: &account_user::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("account_id", curr.account_id, next.account_id)?;
    rules::immutable("email", &curr.email, &next.email)
}

impl Validated for account_user::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[account_user_fields],
        updates: &[account_user_fixed],
        deletes: &[],
    };
}

/// Postal address fields shared by account and account user contacts.
fn postal_address(
    name: &str,
    line1: &str,
    line2: Option<&str>,
    state_province: &str,
    country: &str,
    postal_code: &str,
) -> Result<(), DomainError> {
    rules::name("name", name, NAME_MAX)?;
    rules::name("postal_address_line1", line1, rules::LONG_NAME_MAX)?;
    if let Some(line2) = line2 {
        rules::max_len("postal_address_line2", line2, rules::LONG_NAME_MAX)?;
    }
    rules::name("state_province", state_province, NAME_MAX)?;
    rules::name("country", country, NAME_MAX)?;
    rules::name("postal_code", postal_code, 32)
}

fn account_contact_fields(rec: &account_contact::Model) -> Result<(), DomainError> {
    rules::required_id("account_id", rec.account_id)?;
    postal_address(
        &rec.name,
        &rec.postal_address_line1,
        rec.postal_address_line2.as_deref(),
        &rec.state_province,
        &rec.country,
        &rec.postal_code,
    )
}

fn account_contact_owner_fixed(
    curr: &account_contact::Model,
    next: &account_contact::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("account_id", curr.account_id, next.account_id)
}

impl Validated for account_contact::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[account_contact_fields],
        updates: &[account_contact_owner_fixed],
        deletes: &[],
    };
}

fn account_user_contact_fields(rec: &account_user_contact::Model) -> Result<(), DomainError> {
    rules::required_id("account_user_id", rec.account_user_id)?;
    postal_address(
        &rec.name,
        &rec.postal_address_line1,
        rec.postal_address_line2.as_deref(),
        &rec.state_province,
        &rec.country,
        &rec.postal_code,
    )
}

fn account_user_contact_owner_fixed(
    curr: &account_user_contact::Model,
    next: &account_user_contact::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("account_user_id", curr.account_user_id, next.account_user_id)
}

impl Validated for account_user_contact::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[account_user_contact_fields],
        updates: &[account_user_contact_owner_fixed],
        deletes: &[],
    };
}

/// Exactly one of `account_id` / `account_user_id`, chosen by the product's scope.
fn subscription_scope(rec: &account_subscription::Model) -> Result<(), DomainError> {
    rules::optional_id("account_id", rec.account_id)?;
    rules::optional_id("account_user_id", rec.account_user_id)?;

    let tenant = rec.subscription_type.is_tenant_scoped();
    match (tenant, rec.account_id, rec.account_user_id) {
        (true, Some(_), None) | (false, None, Some(_)) => Ok(()),
        (true, None, _) => Err(DomainError::required("account_id")),
        (false, _, None) => Err(DomainError::required("account_user_id")),
        (true, Some(_), Some(id)) => Err(DomainError::invalid_field(
            "account_user_id",
            id,
            "must not be set for an account-scoped subscription",
        )),
        (false, Some(id), Some(_)) => Err(DomainError::invalid_field(
            "account_id",
            id,
            "must not be set for a user-scoped subscription",
        )),
    }
}

fn subscription_fixed(
    curr: &account_subscription::Model,
    next: &account_subscription::Model,
) -> Result<(), DomainError> {
    if curr.subscription_type != next.subscription_type {
        return Err(DomainError::invalid_field(
            "subscription_type",
            format!("{:?}", next.subscription_type),
            "cannot be changed once set",
        ));
    }
    if curr.account_id != next.account_id || curr.account_user_id != next.account_user_id {
        return Err(DomainError::invalid(
            "subscription owner cannot be changed once set",
        ));
    }
    Ok(())
}

impl Validated for account_subscription::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[subscription_scope],
        updates: &[subscription_fixed],
        deletes: &[],
    };
}

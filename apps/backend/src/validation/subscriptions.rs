//! Game subscription and subscription-instance link validators.

use super::rules;
use super::{Ruleset, Validated};
use crate::entities::{game_subscription, game_subscription_instance, GameSubscriptionType};
use crate::errors::domain::DomainError;

fn subscription_fields(rec: &game_subscription::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("account_id", rec.account_id)?;
    rules::optional_id("account_user_id", rec.account_user_id)?;
    rules::optional_id("account_user_contact_id", rec.account_user_contact_id)?;
    if rec.subscription_type == GameSubscriptionType::Player {
        if rec.account_user_id.is_none() {
            return Err(DomainError::required("account_user_id"));
        }
        if rec.account_user_contact_id.is_none() {
            return Err(DomainError::required("account_user_contact_id"));
        }
    }
    Ok(())
}

fn subscription_fixed(
    curr: &game_subscription::Model,
    next: &game_subscription::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)?;
    rules::immutable_id("account_id", curr.account_id, next.account_id)?;
    if curr.subscription_type != next.subscription_type {
        return Err(DomainError::invalid_field(
            "subscription_type",
            format!("{:?}", next.subscription_type).to_lowercase(),
            "cannot be changed once set",
        ));
    }
    Ok(())
}

impl Validated for game_subscription::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[subscription_fields],
        updates: &[subscription_fixed],
        deletes: &[],
    };
}

fn link_fields(rec: &game_subscription_instance::Model) -> Result<(), DomainError> {
    rules::required_id("game_subscription_id", rec.game_subscription_id)?;
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::required_id("account_id", rec.account_id)?;
    if rec.turn_sheet_token.is_some() != rec.turn_sheet_token_expires_at.is_some() {
        return Err(DomainError::invalid_field(
            "turn_sheet_token_expires_at",
            rec.turn_sheet_token_expires_at
                .map(|t| t.to_string())
                .unwrap_or_default(),
            "a token and its expiry must be set together",
        ));
    }
    Ok(())
}

fn link_fixed(
    curr: &game_subscription_instance::Model,
    next: &game_subscription_instance::Model,
) -> Result<(), DomainError> {
    rules::immutable_id(
        "game_subscription_id",
        curr.game_subscription_id,
        next.game_subscription_id,
    )?;
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)
}

impl Validated for game_subscription_instance::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[link_fields],
        updates: &[link_fixed],
        deletes: &[],
    };
}

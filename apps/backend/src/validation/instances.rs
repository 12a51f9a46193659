//! Game instance and per-instance runtime record validators.

use super::rules;
use super::{Ruleset, Validated};
use crate::domain::instance_status;
use crate::domain::inventory;
use crate::entities::{
    adventure_game_character_instance, adventure_game_creature_instance,
    adventure_game_item_instance, adventure_game_location_instance, game_instance,
    game_instance_parameter,
};
use crate::errors::domain::DomainError;

fn instance_fields(rec: &game_instance::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("game_subscription_id", rec.game_subscription_id)?;
    rules::non_negative("current_turn", rec.current_turn)?;
    rules::non_negative("required_player_count", rec.required_player_count)?;
    if !(rec.delivery_physical_post || rec.delivery_physical_local || rec.delivery_email) {
        return Err(DomainError::invalid_field(
            "delivery_email",
            false,
            "at least one delivery method must be enabled",
        ));
    }
    if rec.is_closed_testing && !rec.delivery_email {
        return Err(DomainError::invalid_field(
            "delivery_email",
            false,
            "closed testing requires email delivery",
        ));
    }
    Ok(())
}

fn instance_transition(
    curr: &game_instance::Model,
    next: &game_instance::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)?;
    rules::immutable_id(
        "game_subscription_id",
        curr.game_subscription_id,
        next.game_subscription_id,
    )?;
    if next.current_turn < curr.current_turn {
        return Err(DomainError::invalid_field(
            "current_turn",
            next.current_turn,
            "turn number cannot go backwards",
        ));
    }
    instance_status::check_transition(curr.status, next.status)
}

impl Validated for game_instance::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[instance_fields],
        updates: &[instance_transition],
        deletes: &[],
    };
}

fn parameter_fields(rec: &game_instance_parameter::Model) -> Result<(), DomainError> {
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::name("parameter_key", &rec.parameter_key, rules::NAME_MAX)?;
    rules::max_len("parameter_value", &rec.parameter_value, rules::DESCRIPTION_MAX)
}

fn parameter_key_fixed(
    curr: &game_instance_parameter::Model,
    next: &game_instance_parameter::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)?;
    rules::immutable("parameter_key", &curr.parameter_key, &next.parameter_key)
}

impl Validated for game_instance_parameter::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[parameter_fields],
        updates: &[parameter_key_fixed],
        deletes: &[],
    };
}

fn location_instance_fields(rec: &adventure_game_location_instance::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::required_id("adventure_game_location_id", rec.adventure_game_location_id)
}

fn location_instance_fixed(
    curr: &adventure_game_location_instance::Model,
    next: &adventure_game_location_instance::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)?;
    rules::immutable_id(
        "adventure_game_location_id",
        curr.adventure_game_location_id,
        next.adventure_game_location_id,
    )
}

impl Validated for adventure_game_location_instance::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[location_instance_fields],
        updates: &[location_instance_fixed],
        deletes: &[],
    };
}

fn item_instance_fields(rec: &adventure_game_item_instance::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::required_id("adventure_game_item_id", rec.adventure_game_item_id)?;
    let owner = inventory::owner_of(rec)?;
    match (&rec.equipment_slot, rec.is_equipped) {
        (Some(slot), false) => {
            return Err(DomainError::invalid_field(
                "equipment_slot",
                slot,
                "must be empty when the item is not equipped",
            ))
        }
        (None, true) => return Err(DomainError::required("equipment_slot")),
        _ => {}
    }
    if rec.is_equipped && !matches!(owner, inventory::Owner::Character(_)) {
        return Err(DomainError::invalid_field(
            "is_equipped",
            true,
            "only items carried by a character can be equipped",
        ));
    }
    Ok(())
}

fn item_instance_fixed(
    curr: &adventure_game_item_instance::Model,
    next: &adventure_game_item_instance::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)?;
    rules::immutable_id(
        "adventure_game_item_id",
        curr.adventure_game_item_id,
        next.adventure_game_item_id,
    )
}

impl Validated for adventure_game_item_instance::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[item_instance_fields],
        updates: &[item_instance_fixed],
        deletes: &[],
    };
}

fn creature_instance_fields(rec: &adventure_game_creature_instance::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::required_id("adventure_game_creature_id", rec.adventure_game_creature_id)?;
    rules::required_id(
        "adventure_game_location_instance_id",
        rec.adventure_game_location_instance_id,
    )?;
    rules::non_negative("health", rec.health)
}

fn creature_instance_fixed(
    curr: &adventure_game_creature_instance::Model,
    next: &adventure_game_creature_instance::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)?;
    rules::immutable_id(
        "adventure_game_creature_id",
        curr.adventure_game_creature_id,
        next.adventure_game_creature_id,
    )
}

impl Validated for adventure_game_creature_instance::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[creature_instance_fields],
        updates: &[creature_instance_fixed],
        deletes: &[],
    };
}

fn character_instance_fields(
    rec: &adventure_game_character_instance::Model,
) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::required_id("adventure_game_character_id", rec.adventure_game_character_id)?;
    rules::optional_id(
        "adventure_game_location_instance_id",
        rec.adventure_game_location_instance_id,
    )?;
    rules::non_negative("health", rec.health)?;
    rules::positive("inventory_capacity", rec.inventory_capacity)
}

fn character_instance_fixed(
    curr: &adventure_game_character_instance::Model,
    next: &adventure_game_character_instance::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)?;
    rules::immutable_id(
        "adventure_game_character_id",
        curr.adventure_game_character_id,
        next.adventure_game_character_id,
    )
}

impl Validated for adventure_game_character_instance::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[character_instance_fields],
        updates: &[character_instance_fixed],
        deletes: &[],
    };
}

//! Designer content validators: games and adventure catalog entities.

use super::rules::{self, DESCRIPTION_MAX, LONG_NAME_MAX, NAME_MAX};
use super::{Ruleset, Validated};
use crate::entities::{
    adventure_game_character, adventure_game_creature, adventure_game_creature_placement,
    adventure_game_item, adventure_game_item_placement, adventure_game_location,
    adventure_game_location_link, adventure_game_location_link_requirement, game, GameStatus,
};
use crate::errors::domain::DomainError;

pub const EQUIPMENT_SLOT_MAX: usize = 64;

/// Optional free text; only the length is bounded.
fn description(value: &str) -> Result<(), DomainError> {
    rules::max_len("description", value, DESCRIPTION_MAX)
}

fn game_fields(rec: &game::Model) -> Result<(), DomainError> {
    rules::name("name", &rec.name, NAME_MAX)?;
    description(&rec.description)?;
    rules::positive("turn_duration_hours", rec.turn_duration_hours)
}

/// Publishing freezes name, type and turn duration; status never goes back to draft.
fn game_publish_freeze(curr: &game::Model, next: &game::Model) -> Result<(), DomainError> {
    if curr.status != GameStatus::Published {
        return Ok(());
    }
    if next.status != GameStatus::Published {
        return Err(DomainError::invalid_field(
            "status",
            "draft",
            "a published game cannot return to draft",
        ));
    }
    rules::immutable("name", &curr.name, &next.name)?;
    if curr.game_type != next.game_type {
        return Err(DomainError::invalid_field(
            "game_type",
            format!("{:?}", next.game_type),
            "cannot be changed once the game is published",
        ));
    }
    rules::immutable(
        "turn_duration_hours",
        &curr.turn_duration_hours,
        &next.turn_duration_hours,
    )
}

impl Validated for game::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[game_fields],
        updates: &[game_publish_freeze],
        deletes: &[],
    };
}

fn location_fields(rec: &adventure_game_location::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::name("name", &rec.name, LONG_NAME_MAX)?;
    description(&rec.description)
}

fn location_game_fixed(
    curr: &adventure_game_location::Model,
    next: &adventure_game_location::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)
}

impl Validated for adventure_game_location::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[location_fields],
        updates: &[location_game_fixed],
        deletes: &[],
    };
}

fn link_fields(rec: &adventure_game_location_link::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id(
        "from_adventure_game_location_id",
        rec.from_adventure_game_location_id,
    )?;
    rules::required_id(
        "to_adventure_game_location_id",
        rec.to_adventure_game_location_id,
    )?;
    if rec.from_adventure_game_location_id == rec.to_adventure_game_location_id {
        return Err(DomainError::invalid_field(
            "to_adventure_game_location_id",
            rec.to_adventure_game_location_id,
            "a link cannot lead back to its own location",
        ));
    }
    rules::name("name", &rec.name, LONG_NAME_MAX)?;
    description(&rec.description)
}

fn link_game_fixed(
    curr: &adventure_game_location_link::Model,
    next: &adventure_game_location_link::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)
}

impl Validated for adventure_game_location_link::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[link_fields],
        updates: &[link_game_fixed],
        deletes: &[],
    };
}

fn requirement_fields(
    rec: &adventure_game_location_link_requirement::Model,
) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id(
        "adventure_game_location_link_id",
        rec.adventure_game_location_link_id,
    )?;
    rules::required_id("adventure_game_item_id", rec.adventure_game_item_id)?;
    rules::positive("quantity", rec.quantity)
}

fn requirement_link_fixed(
    curr: &adventure_game_location_link_requirement::Model,
    next: &adventure_game_location_link_requirement::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)?;
    rules::immutable_id(
        "adventure_game_location_link_id",
        curr.adventure_game_location_link_id,
        next.adventure_game_location_link_id,
    )
}

impl Validated for adventure_game_location_link_requirement::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[requirement_fields],
        updates: &[requirement_link_fixed],
        deletes: &[],
    };
}

fn item_fields(rec: &adventure_game_item::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::name("name", &rec.name, NAME_MAX)?;
    description(&rec.description)?;
    if let Some(slot) = &rec.equipment_slot {
        if !rec.can_be_equipped {
            return Err(DomainError::invalid_field(
                "equipment_slot",
                slot,
                "only equippable items may declare an equipment slot",
            ));
        }
        rules::name("equipment_slot", slot, EQUIPMENT_SLOT_MAX)?;
    }
    Ok(())
}

fn item_game_fixed(
    curr: &adventure_game_item::Model,
    next: &adventure_game_item::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)
}

impl Validated for adventure_game_item::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[item_fields],
        updates: &[item_game_fixed],
        deletes: &[],
    };
}

fn creature_fields(rec: &adventure_game_creature::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::name("name", &rec.name, NAME_MAX)?;
    description(&rec.description)
}

fn creature_game_fixed(
    curr: &adventure_game_creature::Model,
    next: &adventure_game_creature::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)
}

impl Validated for adventure_game_creature::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[creature_fields],
        updates: &[creature_game_fixed],
        deletes: &[],
    };
}

fn character_fields(rec: &adventure_game_character::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("account_id", rec.account_id)?;
    rules::required_id("account_user_id", rec.account_user_id)?;
    rules::name("name", &rec.name, NAME_MAX)?;
    description(&rec.description)
}

fn character_owner_fixed(
    curr: &adventure_game_character::Model,
    next: &adventure_game_character::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)?;
    rules::immutable_id("account_id", curr.account_id, next.account_id)?;
    rules::immutable_id("account_user_id", curr.account_user_id, next.account_user_id)
}

impl Validated for adventure_game_character::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[character_fields],
        updates: &[character_owner_fixed],
        deletes: &[],
    };
}

fn item_placement_fields(rec: &adventure_game_item_placement::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("adventure_game_item_id", rec.adventure_game_item_id)?;
    rules::required_id("adventure_game_location_id", rec.adventure_game_location_id)?;
    rules::non_negative("initial_count", rec.initial_count)
}

fn item_placement_fixed(
    curr: &adventure_game_item_placement::Model,
    next: &adventure_game_item_placement::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)?;
    rules::immutable_id(
        "adventure_game_item_id",
        curr.adventure_game_item_id,
        next.adventure_game_item_id,
    )
}

impl Validated for adventure_game_item_placement::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[item_placement_fields],
        updates: &[item_placement_fixed],
        deletes: &[],
    };
}

fn creature_placement_fields(
    rec: &adventure_game_creature_placement::Model,
) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("adventure_game_creature_id", rec.adventure_game_creature_id)?;
    rules::required_id("adventure_game_location_id", rec.adventure_game_location_id)?;
    rules::non_negative("initial_count", rec.initial_count)
}

fn creature_placement_fixed(
    curr: &adventure_game_creature_placement::Model,
    next: &adventure_game_creature_placement::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)?;
    rules::immutable_id(
        "adventure_game_creature_id",
        curr.adventure_game_creature_id,
        next.adventure_game_creature_id,
    )
}

impl Validated for adventure_game_creature_placement::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[creature_placement_fields],
        updates: &[creature_placement_fixed],
        deletes: &[],
    };
}

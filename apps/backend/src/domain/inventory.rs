//! Inventory and movement rules over instance rows. No I/O; the instance
//! service loads and locks the rows, then applies these.

use std::collections::HashMap;

use uuid::Uuid;

use crate::entities::{
    adventure_game_character_instance as character_instance, adventure_game_item as item_def,
    adventure_game_item_instance as item_instance,
};
use crate::errors::domain::DomainError;

/// Where an item instance currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Location(Uuid),
    Character(Uuid),
    Creature(Uuid),
}

/// The single owner of an item, or an error when zero or several are set.
pub fn owner_of(item: &item_instance::Model) -> Result<Owner, DomainError> {
    match (
        item.adventure_game_location_instance_id,
        item.adventure_game_character_instance_id,
        item.adventure_game_creature_instance_id,
    ) {
        (Some(id), None, None) => Ok(Owner::Location(id)),
        (None, Some(id), None) => Ok(Owner::Character(id)),
        (None, None, Some(id)) => Ok(Owner::Creature(id)),
        _ => Err(DomainError::invalid_field(
            "adventure_game_item_instance_id",
            item.id,
            "item must have exactly one owner: a location, a character or a creature",
        )),
    }
}

pub fn set_owner(item: &mut item_instance::Model, owner: Owner) {
    item.adventure_game_location_instance_id = None;
    item.adventure_game_character_instance_id = None;
    item.adventure_game_creature_instance_id = None;
    match owner {
        Owner::Location(id) => item.adventure_game_location_instance_id = Some(id),
        Owner::Character(id) => item.adventure_game_character_instance_id = Some(id),
        Owner::Creature(id) => item.adventure_game_creature_instance_id = Some(id),
    }
}

fn same_instance(
    character: &character_instance::Model,
    item: &item_instance::Model,
) -> Result<(), DomainError> {
    if character.game_instance_id != item.game_instance_id {
        return Err(DomainError::invalid_field(
            "adventure_game_item_instance_id",
            item.id,
            "item belongs to a different game instance",
        ));
    }
    Ok(())
}

fn in_inventory(
    character: &character_instance::Model,
    item: &item_instance::Model,
) -> Result<(), DomainError> {
    same_instance(character, item)?;
    if item.adventure_game_character_instance_id != Some(character.id) {
        return Err(DomainError::invalid_field(
            "adventure_game_item_instance_id",
            item.id,
            "item is not in this character's inventory",
        ));
    }
    Ok(())
}

/// Item must lie at a location and the character must have room for it.
pub fn pickup(
    character: &character_instance::Model,
    item: &mut item_instance::Model,
    carried: u64,
) -> Result<(), DomainError> {
    same_instance(character, item)?;
    if !matches!(owner_of(item)?, Owner::Location(_)) {
        return Err(DomainError::invalid_field(
            "adventure_game_item_instance_id",
            item.id,
            "item is not at a location",
        ));
    }
    let capacity = u64::try_from(character.inventory_capacity).unwrap_or(0);
    if carried >= capacity {
        return Err(DomainError::invalid_field(
            "inventory_capacity",
            character.inventory_capacity,
            "inventory is full",
        ));
    }
    set_owner(item, Owner::Character(character.id));
    item.is_equipped = false;
    item.equipment_slot = None;
    Ok(())
}

/// Unequips if needed and leaves the item at the character's location.
pub fn drop_item(
    character: &character_instance::Model,
    item: &mut item_instance::Model,
) -> Result<(), DomainError> {
    in_inventory(character, item)?;
    let location = character
        .adventure_game_location_instance_id
        .ok_or_else(|| {
            DomainError::invalid_field(
                "adventure_game_character_instance_id",
                character.id,
                "character has no current location",
            )
        })?;
    item.is_equipped = false;
    item.equipment_slot = None;
    set_owner(item, Owner::Location(location));
    Ok(())
}

/// Equip into `slot`. Displacing whatever already occupies the slot is the caller's job.
pub fn equip(
    character: &character_instance::Model,
    item: &mut item_instance::Model,
    definition: &item_def::Model,
    slot: &str,
) -> Result<(), DomainError> {
    in_inventory(character, item)?;
    if definition.id != item.adventure_game_item_id {
        return Err(DomainError::internal("item definition does not match item instance"));
    }
    if !definition.can_be_equipped {
        return Err(DomainError::invalid_field(
            "adventure_game_item_instance_id",
            item.id,
            "item cannot be equipped",
        ));
    }
    let slot = slot.trim();
    if slot.is_empty() {
        return Err(DomainError::required("equipment_slot"));
    }
    if let Some(fixed) = &definition.equipment_slot {
        if fixed != slot {
            return Err(DomainError::invalid_field(
                "equipment_slot",
                slot,
                format!("item can only be equipped in slot {fixed}"),
            ));
        }
    }
    item.is_equipped = true;
    item.equipment_slot = Some(slot.to_string());
    Ok(())
}

pub fn unequip(
    character: &character_instance::Model,
    item: &mut item_instance::Model,
) -> Result<(), DomainError> {
    in_inventory(character, item)?;
    if !item.is_equipped {
        return Err(DomainError::invalid_field(
            "adventure_game_item_instance_id",
            item.id,
            "item is not equipped",
        ));
    }
    item.is_equipped = false;
    item.equipment_slot = None;
    Ok(())
}

/// One link requirement the character's inventory does not cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetRequirement {
    pub adventure_game_item_id: Uuid,
    pub required: i32,
    pub held: i32,
}

/// Requirements are AND-joined; held counts sum item instances per catalog item.
pub fn unmet_requirements(
    requirements: &[(Uuid, i32)],
    inventory_item_ids: &[Uuid],
) -> Vec<UnmetRequirement> {
    let mut held: HashMap<Uuid, i32> = HashMap::new();
    for id in inventory_item_ids {
        *held.entry(*id).or_default() += 1;
    }
    requirements
        .iter()
        .filter_map(|(item_id, quantity)| {
            let have = held.get(item_id).copied().unwrap_or(0);
            (have < *quantity).then_some(UnmetRequirement {
                adventure_game_item_id: *item_id,
                required: *quantity,
                held: have,
            })
        })
        .collect()
}

//! Character inventory operations over instance rows.

use tracing::debug;
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::domain::inventory;
use crate::entities::{
    adventure_game_character_instance as character_instance, adventure_game_item as item_def,
    adventure_game_item_instance as item_instance, game_instance,
};
use crate::errors::domain::DomainError;
use crate::repos::Scope;
use crate::services::crud;
use crate::services::game_instances::GameInstanceService;

/// Result of equipping: the item and whatever it pushed out of the slot.
#[derive(Debug, Clone)]
pub struct EquipOutcome {
    pub item: item_instance::Model,
    pub displaced: Option<item_instance::Model>,
}

/// Inventory service. Every operation locks the character first and the
/// item second so concurrent moves on the same character serialise.
pub struct InventoryService;

impl InventoryService {
    pub fn new() -> Self {
        Self
    }

    async fn lock_pair(
        scope: &Scope<'_>,
        character_id: Uuid,
        item_id: Uuid,
    ) -> Result<(character_instance::Model, item_instance::Model), DomainError> {
        let character = scope
            .repo::<character_instance::Entity>()
            .get_one(character_id, Lock::ForUpdateNoWait)
            .await?;
        let item = scope
            .repo::<item_instance::Entity>()
            .get_one(item_id, Lock::ForUpdateNoWait)
            .await?;
        Ok((character, item))
    }

    async fn carried(scope: &Scope<'_>, character_id: Uuid) -> Result<u64, DomainError> {
        scope
            .unrestricted()
            .repo::<item_instance::Entity>()
            .count(&QueryOptions::new().eq("adventure_game_character_instance_id", character_id))
            .await
    }

    pub async fn pickup(
        &self,
        scope: &Scope<'_>,
        character_id: Uuid,
        item_id: Uuid,
    ) -> Result<item_instance::Model, DomainError> {
        let (character, mut item) = Self::lock_pair(scope, character_id, item_id).await?;
        let carried = Self::carried(scope, character.id).await?;
        inventory::pickup(&character, &mut item, carried)?;
        let item = crud::update::<item_instance::Entity>(scope, item).await?;
        debug!(character_id = %character.id, item_id = %item.id, "Item picked up");
        Ok(item)
    }

    /// Leave an item at the character's location, unless the instance forbids it.
    pub async fn drop(
        &self,
        scope: &Scope<'_>,
        character_id: Uuid,
        item_id: Uuid,
    ) -> Result<item_instance::Model, DomainError> {
        let (character, mut item) = Self::lock_pair(scope, character_id, item_id).await?;
        let instance = scope
            .unrestricted()
            .repo::<game_instance::Entity>()
            .get_one(character.game_instance_id, Lock::None)
            .await?;
        if !GameInstanceService::new()
            .allows_item_drop(scope, &instance)
            .await?
        {
            return Err(DomainError::invalid_field(
                "adventure_game_item_instance_id",
                item.id,
                "dropping items is disabled for this game instance",
            ));
        }
        inventory::drop_item(&character, &mut item)?;
        let item = crud::update::<item_instance::Entity>(scope, item).await?;
        debug!(character_id = %character.id, item_id = %item.id, "Item dropped");
        Ok(item)
    }

    /// Equip into `slot`. An item already in that slot is unequipped first
    /// and stays in the inventory.
    pub async fn equip(
        &self,
        scope: &Scope<'_>,
        character_id: Uuid,
        item_id: Uuid,
        slot: &str,
    ) -> Result<EquipOutcome, DomainError> {
        let (character, mut item) = Self::lock_pair(scope, character_id, item_id).await?;
        let definition = scope
            .unrestricted()
            .repo::<item_def::Entity>()
            .get_one(item.adventure_game_item_id, Lock::None)
            .await?;
        inventory::equip(&character, &mut item, &definition, slot)?;

        let occupant = scope
            .repo::<item_instance::Entity>()
            .first(
                QueryOptions::new()
                    .eq("adventure_game_character_instance_id", character.id)
                    .eq("is_equipped", true)
                    .eq("equipment_slot", slot.trim().to_string())
                    .ne("id", item.id)
                    .with_lock(Lock::ForUpdateNoWait),
            )
            .await?;
        let displaced = match occupant {
            Some(mut other) => {
                inventory::unequip(&character, &mut other)?;
                Some(crud::update::<item_instance::Entity>(scope, other).await?)
            }
            None => None,
        };

        let item = crud::update::<item_instance::Entity>(scope, item).await?;
        debug!(
            character_id = %character.id,
            item_id = %item.id,
            displaced = displaced.is_some(),
            "Item equipped"
        );
        Ok(EquipOutcome { item, displaced })
    }

    pub async fn unequip(
        &self,
        scope: &Scope<'_>,
        character_id: Uuid,
        item_id: Uuid,
    ) -> Result<item_instance::Model, DomainError> {
        let (character, mut item) = Self::lock_pair(scope, character_id, item_id).await?;
        inventory::unequip(&character, &mut item)?;
        crud::update::<item_instance::Entity>(scope, item).await
    }
}

impl Default for InventoryService {
    fn default() -> Self {
        Self::new()
    }
}

use pbm_backend::domain::parameters::{ALLOW_ITEM_DROP, INVENTORY_CAPACITY};
use pbm_backend::entities::{adventure_game_character_instance, adventure_game_item_instance};
use pbm_backend::services::{crud, GameInstanceService, InventoryService};
use pbm_backend::{with_txn, DomainError, Rls};

use crate::common::assert_invalid;
use crate::support::test_state::build_test_state;
use crate::support::world::{
    add_player, build_world, create_instance, item_instances, location_instance,
    reload_character, seat_player,
};

#[tokio::test]
async fn pickup_and_drop_move_items_between_owners() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let hall = location_instance(&scope, instance.id, world.hall.id).await?;
            let key = item_instances(&scope, instance.id, world.key.id).await?[0].clone();
            let inventory = InventoryService::new();

            let carried = inventory.pickup(&scope, character.id, key.id).await?;
            assert_eq!(carried.adventure_game_character_instance_id, Some(character.id));
            assert!(carried.adventure_game_location_instance_id.is_none());

            assert_invalid(
                inventory.pickup(&scope, character.id, key.id).await,
                "item is not at a location",
            );

            let dropped = inventory.drop(&scope, character.id, key.id).await?;
            assert_eq!(dropped.adventure_game_location_instance_id, Some(hall.id));
            assert!(dropped.adventure_game_character_instance_id.is_none());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn a_full_inventory_refuses_more_items() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let instances = GameInstanceService::new();
            instances
                .set_parameter(&scope, instance.id, INVENTORY_CAPACITY, "1")
                .await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            instances.start_game_instance(&scope, instance.id).await?;
            let swords = item_instances(&scope, instance.id, world.sword.id).await?;
            let inventory = InventoryService::new();

            inventory.pickup(&scope, character.id, swords[0].id).await?;
            assert_invalid(
                inventory.pickup(&scope, character.id, swords[1].id).await,
                "inventory is full",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn dropping_can_be_disabled_per_instance() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let instances = GameInstanceService::new();
            instances
                .set_parameter(&scope, instance.id, ALLOW_ITEM_DROP, "false")
                .await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            instances.start_game_instance(&scope, instance.id).await?;
            let key = item_instances(&scope, instance.id, world.key.id).await?[0].clone();
            let inventory = InventoryService::new();

            inventory.pickup(&scope, character.id, key.id).await?;
            assert_invalid(
                inventory.drop(&scope, character.id, key.id).await,
                "dropping items is disabled for this game instance",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn equipping_displaces_the_slot_occupant() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let swords = item_instances(&scope, instance.id, world.sword.id).await?;
            let key = item_instances(&scope, instance.id, world.key.id).await?[0].clone();
            let inventory = InventoryService::new();
            for item in swords.iter().chain([&key]) {
                inventory.pickup(&scope, character.id, item.id).await?;
            }

            assert_invalid(
                inventory.equip(&scope, character.id, key.id, "hand").await,
                "item cannot be equipped",
            );
            assert_invalid(
                inventory.equip(&scope, character.id, swords[0].id, "head").await,
                "item can only be equipped in slot hand",
            );

            let first = inventory
                .equip(&scope, character.id, swords[0].id, "hand")
                .await?;
            assert!(first.item.is_equipped);
            assert_eq!(first.item.equipment_slot.as_deref(), Some("hand"));
            assert!(first.displaced.is_none());

            let second = inventory
                .equip(&scope, character.id, swords[1].id, "hand")
                .await?;
            let displaced = second.displaced.expect("first sword displaced");
            assert_eq!(displaced.id, swords[0].id);
            assert!(!displaced.is_equipped);
            assert_eq!(displaced.adventure_game_character_instance_id, Some(character.id));

            let bare = inventory
                .unequip(&scope, character.id, swords[1].id)
                .await?;
            assert!(!bare.is_equipped);
            assert!(bare.equipment_slot.is_none());
            assert_invalid(
                inventory.unequip(&scope, character.id, swords[1].id).await,
                "item is not equipped",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn direct_updates_cannot_equip_two_items_in_one_slot() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let swords = item_instances(&scope, instance.id, world.sword.id).await?;
            let inventory = InventoryService::new();
            let mut carried = Vec::new();
            for sword in &swords {
                carried.push(inventory.pickup(&scope, character.id, sword.id).await?);
            }

            let in_hand = |item: &adventure_game_item_instance::Model| {
                adventure_game_item_instance::Model {
                    is_equipped: true,
                    equipment_slot: Some("hand".to_string()),
                    ..item.clone()
                }
            };
            crud::update::<adventure_game_item_instance::Entity>(&scope, in_hand(&carried[0]))
                .await?;
            assert_invalid(
                crud::update::<adventure_game_item_instance::Entity>(&scope, in_hand(&carried[1]))
                    .await,
                "another item is already equipped in slot hand",
            );

            let equipped = item_instances(&scope, instance.id, world.sword.id)
                .await?
                .into_iter()
                .filter(|i| i.is_equipped)
                .count();
            assert_eq!(equipped, 1);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn capacity_cannot_shrink_below_what_is_carried() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let inventory = InventoryService::new();
            for sword in item_instances(&scope, instance.id, world.sword.id).await? {
                inventory.pickup(&scope, character.id, sword.id).await?;
            }
            let character = reload_character(&scope, character.id).await?;

            assert_invalid(
                crud::update::<adventure_game_character_instance::Entity>(
                    &scope,
                    adventure_game_character_instance::Model {
                        inventory_capacity: 1,
                        ..character.clone()
                    },
                )
                .await,
                "capacity cannot drop below the 2 items carried",
            );

            // Shrinking down to exactly what is carried is fine
            let snug = crud::update::<adventure_game_character_instance::Entity>(
                &scope,
                adventure_game_character_instance::Model {
                    inventory_capacity: 2,
                    ..character
                },
            )
            .await?;
            assert_eq!(snug.inventory_capacity, 2);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn direct_updates_cannot_overfill_an_inventory() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let instances = GameInstanceService::new();
            instances
                .set_parameter(&scope, instance.id, INVENTORY_CAPACITY, "1")
                .await?;
            let (_, character) = seat_player(&scope, &alice, instance.id).await?;
            instances.start_game_instance(&scope, instance.id).await?;
            let sword = item_instances(&scope, instance.id, world.sword.id).await?[0].clone();
            let key = item_instances(&scope, instance.id, world.key.id).await?[0].clone();

            InventoryService::new()
                .pickup(&scope, character.id, sword.id)
                .await?;
            assert_invalid(
                crud::update::<adventure_game_item_instance::Entity>(
                    &scope,
                    adventure_game_item_instance::Model {
                        adventure_game_location_instance_id: None,
                        adventure_game_character_instance_id: Some(character.id),
                        ..key.clone()
                    },
                )
                .await,
                "inventory is full",
            );

            // A location of another instance is not a valid owner either
            let other = create_instance(&scope, &world).await?;
            instances.start_game_instance(&scope, other.id).await?;
            let elsewhere = location_instance(&scope, other.id, world.hall.id).await?;
            assert_invalid(
                crud::update::<adventure_game_item_instance::Entity>(
                    &scope,
                    adventure_game_item_instance::Model {
                        adventure_game_location_instance_id: Some(elsewhere.id),
                        ..key
                    },
                )
                .await,
                "owner belongs to a different game instance",
            );

            Ok(())
        })
    })
    .await
}

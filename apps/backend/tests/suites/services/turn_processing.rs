use pbm_backend::domain::turn_sheet_data::{self, JoinGameScanData, SheetType};
use pbm_backend::entities::{game_instance, ProcessingStatus};
use pbm_backend::services::{
    crud, GameInstanceService, InventoryService, TurnReport, TurnSheetService,
};
use pbm_backend::{with_txn, DomainError, Rls};

use crate::support::test_state::build_test_state;
use crate::support::world::{
    add_player, build_world, choose, create_instance, item_instances, location_instance, offered,
    reload_character, seat_player, sheet_for, sheets_for_turn,
};

const SCANNER: &str = "scanner-01";

#[tokio::test]
async fn a_completed_choice_moves_the_character() -> Result<(), DomainError> {
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
            let yard = location_instance(&scope, instance.id, world.yard.id).await?;
            let sheet = sheet_for(&scope, character.id, 0).await?;
            let options = offered(&sheet)?;
            assert_eq!(options.current_location_id, hall.id);
            assert_eq!(options.current_location_name, "Great Hall");
            assert_eq!(options.location_options.len(), 1);
            assert_eq!(options.location_options[0].location_id, yard.id);
            assert_eq!(options.location_options[0].label, world.to_yard.name);

            let sheets = TurnSheetService::new();
            sheets
                .ingest_scan(&scope, sheet.id, 0.9, SCANNER, &choose(yard.id)?)
                .await?;
            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(
                report,
                TurnReport {
                    game_instance_id: instance.id,
                    processed_turn: 0,
                    applied: 1,
                    failed: 0,
                    skipped: 0,
                    issued: 1,
                }
            );

            let moved = reload_character(&scope, character.id).await?;
            assert_eq!(moved.adventure_game_location_instance_id, Some(yard.id));

            // Next turn offers the courtyard's exits, sorted by label
            let next = sheet_for(&scope, character.id, 1).await?;
            assert_eq!(next.processing_status, ProcessingStatus::Pending);
            let labels: Vec<String> = offered(&next)?
                .location_options
                .into_iter()
                .map(|o| o.label)
                .collect();
            assert_eq!(labels, vec!["Back to the hall", "Iron gate"]);

            let advanced = pbm_backend::services::crud::get_one::<
                pbm_backend::entities::game_instance::Entity,
            >(&scope, instance.id)
            .await?;
            assert_eq!(advanced.current_turn, 1);
            assert!(advanced.last_turn_processed_at.is_some());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unanswered_sheets_are_skipped_and_reissued() -> Result<(), DomainError> {
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

            let report = TurnSheetService::new()
                .process_turn(&scope, instance.id)
                .await?;
            assert_eq!(report.applied, 0);
            assert_eq!(report.skipped, 1);
            assert_eq!(report.issued, 1);

            let stale = sheet_for(&scope, character.id, 0).await?;
            assert_eq!(stale.processing_status, ProcessingStatus::Pending);
            let hall = location_instance(&scope, instance.id, world.hall.id).await?;
            let still = reload_character(&scope, character.id).await?;
            assert_eq!(still.adventure_game_location_instance_id, Some(hall.id));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn a_locked_exit_errors_the_sheet_until_the_key_is_carried() -> Result<(), DomainError> {
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
            let yard = location_instance(&scope, instance.id, world.yard.id).await?;
            let vault = location_instance(&scope, instance.id, world.vault.id).await?;
            let sheets = TurnSheetService::new();

            let turn0 = sheet_for(&scope, character.id, 0).await?;
            sheets
                .ingest_scan(&scope, turn0.id, 1.0, SCANNER, &choose(yard.id)?)
                .await?;
            sheets.process_turn(&scope, instance.id).await?;

            // Turn 1: through the iron gate without the key
            let turn1 = sheet_for(&scope, character.id, 1).await?;
            sheets
                .ingest_scan(&scope, turn1.id, 1.0, SCANNER, &choose(vault.id)?)
                .await?;
            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(report.applied, 0);
            assert_eq!(report.failed, 1);
            let rejected = sheet_for(&scope, character.id, 1).await?;
            assert_eq!(rejected.processing_status, ProcessingStatus::Error);
            assert_eq!(
                rejected.error_message.as_deref(),
                Some("invalid data: 'Iron gate' requires items the character does not carry")
            );
            let stuck = reload_character(&scope, character.id).await?;
            assert_eq!(stuck.adventure_game_location_instance_id, Some(yard.id));

            // Turn 2: with the key in hand
            let key = item_instances(&scope, instance.id, world.key.id).await?;
            InventoryService::new()
                .pickup(&scope, character.id, key[0].id)
                .await?;
            let turn2 = sheet_for(&scope, character.id, 2).await?;
            sheets
                .ingest_scan(&scope, turn2.id, 1.0, SCANNER, &choose(vault.id)?)
                .await?;
            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(report.applied, 1);
            let inside = reload_character(&scope, character.id).await?;
            assert_eq!(inside.adventure_game_location_instance_id, Some(vault.id));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn a_location_that_was_not_offered_is_rejected() -> Result<(), DomainError> {
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
            let vault = location_instance(&scope, instance.id, world.vault.id).await?;
            let sheets = TurnSheetService::new();

            let sheet = sheet_for(&scope, character.id, 0).await?;
            sheets
                .ingest_scan(&scope, sheet.id, 1.0, SCANNER, &choose(vault.id)?)
                .await?;
            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(report.failed, 1);

            let rejected = sheet_for(&scope, character.id, 0).await?;
            assert_eq!(
                rejected.error_message.as_deref(),
                Some("invalid data: location was not offered on this turn sheet")
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn one_rejected_sheet_does_not_hold_back_the_others() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let bob = add_player(&scope, &world, "bob").await?;
            let instance = create_instance(&scope, &world).await?;
            let (_, first) = seat_player(&scope, &alice, instance.id).await?;
            let (_, second) = seat_player(&scope, &bob, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let hall = location_instance(&scope, instance.id, world.hall.id).await?;
            let yard = location_instance(&scope, instance.id, world.yard.id).await?;
            let vault = location_instance(&scope, instance.id, world.vault.id).await?;
            let sheets = TurnSheetService::new();

            let good = sheet_for(&scope, first.id, 0).await?;
            sheets
                .ingest_scan(&scope, good.id, 0.9, SCANNER, &choose(yard.id)?)
                .await?;
            let bad = sheet_for(&scope, second.id, 0).await?;
            sheets
                .ingest_scan(&scope, bad.id, 0.9, SCANNER, &choose(vault.id)?)
                .await?;

            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(report.processed_turn, 0);
            assert_eq!(report.applied, 1);
            assert_eq!(report.failed, 1);
            assert_eq!(report.skipped, 0);
            assert_eq!(report.issued, 2);

            let good = sheet_for(&scope, first.id, 0).await?;
            assert_eq!(good.processing_status, ProcessingStatus::Completed);
            let bad = sheet_for(&scope, second.id, 0).await?;
            assert_eq!(bad.processing_status, ProcessingStatus::Error);
            assert_eq!(
                bad.error_message.as_deref(),
                Some("invalid data: location was not offered on this turn sheet")
            );

            let moved = reload_character(&scope, first.id).await?;
            assert_eq!(moved.adventure_game_location_instance_id, Some(yard.id));
            let stayed = reload_character(&scope, second.id).await?;
            assert_eq!(stayed.adventure_game_location_instance_id, Some(hall.id));

            let advanced = crud::get_one::<game_instance::Entity>(&scope, instance.id).await?;
            assert_eq!(advanced.current_turn, 1);
            assert!(advanced.last_turn_processed_at.is_some());

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn a_processed_join_sheet_brings_the_character_into_the_world() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let bob = add_player(&scope, &world, "bob").await?;
            let instance = create_instance(&scope, &world).await?;
            let (_, early) = seat_player(&scope, &alice, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let (_, late) = seat_player(&scope, &bob, instance.id).await?;

            let join = sheet_for(&scope, late.id, 0).await?;
            assert_eq!(join.sheet_type, SheetType::JoinGame.as_str());
            let payload = turn_sheet_data::encode(&JoinGameScanData {
                email: bob.user.email.clone(),
                name: "Bob".to_string(),
                character_name: bob.character.name.clone(),
            })?;
            let sheets = TurnSheetService::new();
            sheets
                .ingest_scan(&scope, join.id, 0.8, SCANNER, &payload)
                .await?;

            // Join sheets sort ahead of location choices within a turn
            let ordered = sheets_for_turn(&scope, instance.id, 0).await?;
            assert_eq!(ordered.len(), 2);

            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(report.applied, 1);
            assert_eq!(report.skipped, 1);
            assert_eq!(report.issued, 2);

            let hall = location_instance(&scope, instance.id, world.hall.id).await?;
            let entered = reload_character(&scope, late.id).await?;
            assert_eq!(entered.adventure_game_location_instance_id, Some(hall.id));
            let next = sheet_for(&scope, late.id, 1).await?;
            assert_eq!(next.sheet_type, SheetType::LocationChoice.as_str());
            assert_eq!(sheet_for(&scope, early.id, 1).await?.turn_number, 1);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn generating_sheets_twice_issues_nothing_new() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            seat_player(&scope, &alice, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;

            let issued = TurnSheetService::new()
                .generate_next_sheets(&scope, instance.id)
                .await?;
            assert_eq!(issued, 0);
            assert_eq!(sheets_for_turn(&scope, instance.id, 0).await?.len(), 1);

            Ok(())
        })
    })
    .await
}

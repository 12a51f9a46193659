use pbm_backend::domain::turn_sheet_data::{self, LocationChoiceScanData};
use pbm_backend::entities::ProcessingStatus;
use pbm_backend::services::turn_sheets::ONLINE_SCANNER;
use pbm_backend::services::{GameInstanceService, TurnSheetService};
use pbm_backend::{with_txn, DomainError, Rls};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::common::assert_invalid;
use crate::support::test_state::build_test_state;
use crate::support::world::{
    add_player, build_world, choose, create_instance, location_instance, seat_player, sheet_for,
};

#[tokio::test]
async fn tokens_expire_and_rotate() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let (link, _) = seat_player(&scope, &alice, instance.id).await?;
            let sheets = TurnSheetService::new();
            let now = OffsetDateTime::now_utc();

            assert_invalid(
                sheets
                    .verify_token_at(&scope, link.id, Uuid::new_v4(), now)
                    .await,
                "no turn sheet token has been issued",
            );

            let issued = sheets.generate_token_at(&scope, link.id, now).await?;
            let token = issued.turn_sheet_token.expect("token minted");
            let expires = issued
                .turn_sheet_token_expires_at
                .expect("expiry stored with the token");
            // stored timestamps may lose sub-microsecond precision
            assert!((expires - (now + scope.config.token_ttl())).abs() < Duration::seconds(1));

            let verified = sheets
                .verify_token_at(&scope, link.id, token, now + Duration::hours(1))
                .await?;
            assert_eq!(verified.id, link.id);
            assert_invalid(
                sheets
                    .verify_token_at(&scope, link.id, Uuid::new_v4(), now)
                    .await,
                "turn sheet token does not match",
            );
            assert_invalid(
                sheets
                    .verify_token_at(
                        &scope,
                        link.id,
                        token,
                        now + scope.config.token_ttl() + Duration::seconds(1),
                    )
                    .await,
                "turn sheet token has expired",
            );

            // A fresh token retires the old one
            let rotated = sheets.generate_token_at(&scope, link.id, now).await?;
            assert_ne!(rotated.turn_sheet_token, Some(token));
            assert_invalid(
                sheets.verify_token_at(&scope, link.id, token, now).await,
                "turn sheet token does not match",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn sheets_move_through_scanned_to_completed() -> Result<(), DomainError> {
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
            let sheet = sheet_for(&scope, character.id, 0).await?;
            let sheets = TurnSheetService::new();

            assert_invalid(
                sheets.mark_completed(&scope, sheet.id, Vec::new()).await,
                "marking completed requires a scanned turn sheet",
            );
            assert_invalid(
                sheets.mark_scanned(&scope, sheet.id, 1.5, "scanner-02").await,
                "must be between 0 and 1",
            );

            let scanned = sheets
                .mark_scanned(&scope, sheet.id, 0.75, "scanner-02")
                .await?;
            assert_eq!(scanned.processing_status, ProcessingStatus::Scanned);
            assert_eq!(scanned.scan_quality, Some(0.75));
            assert_eq!(scanned.scanned_by.as_deref(), Some("scanner-02"));
            assert!(scanned.scanned_at.is_some());
            assert!(!scanned.is_completed);

            assert_invalid(
                sheets.mark_scanned(&scope, sheet.id, 0.75, "scanner-02").await,
                "marking scanned requires a pending turn sheet",
            );

            let payload = b"{\"choices\":[]}".to_vec();
            let completed = sheets
                .mark_completed(&scope, sheet.id, payload.clone())
                .await?;
            assert_eq!(completed.processing_status, ProcessingStatus::Completed);
            assert!(completed.is_completed);
            assert!(completed.completed_at.is_some());
            assert_eq!(completed.scanned_data, Some(payload));

            let errored = sheets
                .mark_error(&scope, sheet.id, "smudged beyond reading")
                .await?;
            assert_eq!(errored.processing_status, ProcessingStatus::Error);
            assert_eq!(errored.error_message.as_deref(), Some("smudged beyond reading"));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unreadable_scans_land_in_error() -> Result<(), DomainError> {
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
            let sheets = TurnSheetService::new();

            let garbled = sheet_for(&scope, first.id, 0).await?;
            let out = sheets
                .ingest_scan(&scope, garbled.id, 0.4, "scanner-03", b"%%%")
                .await?;
            assert_eq!(out.processing_status, ProcessingStatus::Error);
            assert!(out
                .error_message
                .as_deref()
                .unwrap_or_default()
                .starts_with("invalid data: malformed payload"));
            assert_eq!(out.scanned_by.as_deref(), Some("scanner-03"));

            let blank = sheet_for(&scope, second.id, 0).await?;
            let empty = turn_sheet_data::encode(&LocationChoiceScanData { choices: vec![] })?;
            let out = sheets
                .ingest_scan(&scope, blank.id, 0.9, "scanner-03", &empty)
                .await?;
            assert_eq!(out.processing_status, ProcessingStatus::Error);
            assert_eq!(out.error_message.as_deref(), Some("required field: choices"));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn token_submission_completes_the_players_own_sheet() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let bob = add_player(&scope, &world, "bob").await?;
            let instance = create_instance(&scope, &world).await?;
            let (link, first) = seat_player(&scope, &alice, instance.id).await?;
            let (_, second) = seat_player(&scope, &bob, instance.id).await?;
            GameInstanceService::new()
                .start_game_instance(&scope, instance.id)
                .await?;
            let yard = location_instance(&scope, instance.id, world.yard.id).await?;
            let sheets = TurnSheetService::new();
            let token = sheets
                .generate_token(&scope, link.id)
                .await?
                .turn_sheet_token
                .expect("token minted");

            let own = sheet_for(&scope, first.id, 0).await?;
            let other = sheet_for(&scope, second.id, 0).await?;
            assert_invalid(
                sheets
                    .submit_turn_sheet_with_token(&scope, link.id, token, other.id, &choose(yard.id)?)
                    .await,
                "turn sheet does not belong to this player",
            );
            assert_invalid(
                sheets
                    .submit_turn_sheet_with_token(
                        &scope,
                        link.id,
                        Uuid::new_v4(),
                        own.id,
                        &choose(yard.id)?,
                    )
                    .await,
                "turn sheet token does not match",
            );

            let submitted = sheets
                .submit_turn_sheet_with_token(&scope, link.id, token, own.id, &choose(yard.id)?)
                .await?;
            assert_eq!(submitted.processing_status, ProcessingStatus::Completed);
            assert_eq!(submitted.scanned_by.as_deref(), Some(ONLINE_SCANNER));
            assert_eq!(submitted.scan_quality, Some(1.0));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn only_the_current_turn_of_a_running_game_takes_answers() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let (link, character) = seat_player(&scope, &alice, instance.id).await?;
            let instances = GameInstanceService::new();
            instances.start_game_instance(&scope, instance.id).await?;
            let yard = location_instance(&scope, instance.id, world.yard.id).await?;
            let sheets = TurnSheetService::new();
            let token = sheets
                .generate_token(&scope, link.id)
                .await?
                .turn_sheet_token
                .expect("token minted");

            // Turn 0 passes unanswered
            let report = sheets.process_turn(&scope, instance.id).await?;
            assert_eq!(report.processed_turn, 0);
            let stale = sheet_for(&scope, character.id, 0).await?;
            assert_eq!(stale.processing_status, ProcessingStatus::Pending);

            assert_invalid(
                sheets
                    .ingest_scan(&scope, stale.id, 0.9, "scanner-04", &choose(yard.id)?)
                    .await,
                "turn sheet is for turn 0 but the game is on turn 1",
            );
            assert_invalid(
                sheets
                    .submit_turn_sheet_with_token(&scope, link.id, token, stale.id, &choose(yard.id)?)
                    .await,
                "turn sheet is for turn 0 but the game is on turn 1",
            );
            let untouched = sheet_for(&scope, character.id, 0).await?;
            assert_eq!(untouched.processing_status, ProcessingStatus::Pending);
            assert!(untouched.scanned_by.is_none());

            // A paused game takes no answers, even for the current turn
            let current = sheet_for(&scope, character.id, 1).await?;
            instances.pause_game_instance(&scope, instance.id).await?;
            assert_invalid(
                sheets
                    .ingest_scan(&scope, current.id, 0.9, "scanner-04", &choose(yard.id)?)
                    .await,
                "game instance is not accepting turn sheets",
            );

            instances.start_game_instance(&scope, instance.id).await?;
            let answered = sheets
                .ingest_scan(&scope, current.id, 0.9, "scanner-04", &choose(yard.id)?)
                .await?;
            assert_eq!(answered.processing_status, ProcessingStatus::Completed);

            Ok(())
        })
    })
    .await
}

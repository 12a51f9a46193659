//! Turn sheet generation and per-turn processing.
//!
//! Processing holds the instance row lock for the whole turn. Sheets are
//! applied in `(sheet_order, id)` order; a sheet whose content is rejected is
//! marked `error` and the turn carries on.

use std::collections::HashMap;

use sea_orm::Order;
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::domain::instance_status::status_name;
use crate::domain::inventory;
use crate::domain::parameters::WELCOME_MESSAGE;
use crate::domain::turn_sheet_data::{
    self, parse_scan, JoinGameData, LocationChoiceData, LocationChoiceScanData, LocationOption,
    ScanPayload, SheetType,
};
use crate::entities::{
    adventure_game_character, adventure_game_character_instance, adventure_game_item_instance,
    adventure_game_location, adventure_game_location_instance, adventure_game_location_link,
    adventure_game_location_link_requirement, adventure_game_turn_sheet, game_instance,
    game_turn_sheet, GameInstanceStatus, ProcessingStatus,
};
use crate::errors::domain::DomainError;
use crate::repos::Scope;
use crate::services::catalog::require_game;
use crate::services::crud;
use crate::services::game_instances::{load_parameters, lock_instance, starting_location_instance};
use crate::services::turn_sheets::record_error;

/// Outcome of one `process_turn` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub game_instance_id: Uuid,
    /// Turn whose sheets were applied
    pub processed_turn: i32,
    pub applied: usize,
    pub failed: usize,
    /// Sheets never completed by their player
    pub skipped: usize,
    /// Sheets created for the next turn
    pub issued: usize,
}

/// Lock the instance, apply the completed sheets of the current turn, advance
/// the turn and issue the next round of sheets.
pub async fn process_turn(
    scope: &Scope<'_>,
    game_instance_id: Uuid,
) -> Result<TurnReport, DomainError> {
    let mut instance = lock_instance(scope, game_instance_id).await?;
    if instance.status != GameInstanceStatus::Started {
        return Err(DomainError::invalid_field(
            "status",
            status_name(instance.status),
            "only a started game instance can process turns",
        ));
    }
    let turn = instance.current_turn;
    info!(%game_instance_id, turn, "Processing turn");

    let sheets = scope
        .unrestricted()
        .repo::<game_turn_sheet::Entity>()
        .get_many(
            &QueryOptions::new()
                .eq("game_instance_id", instance.id)
                .eq("turn_number", turn)
                .with_sort("sheet_order", Order::Asc)
                .with_sort("id", Order::Asc),
        )
        .await?;

    let mut report = TurnReport {
        game_instance_id,
        processed_turn: turn,
        applied: 0,
        failed: 0,
        skipped: 0,
        issued: 0,
    };

    for sheet in &sheets {
        if sheet.processing_status != ProcessingStatus::Completed {
            report.skipped += 1;
            continue;
        }
        match apply_sheet(scope, &instance, sheet).await {
            Ok(()) => report.applied += 1,
            Err(e) if e.is_invalid_data() || e.is_not_found() => {
                warn!(
                    %game_instance_id,
                    turn,
                    sheet_id = %sheet.id,
                    error = %e,
                    "Turn sheet rejected"
                );
                record_error(scope, sheet.id, &e.to_string()).await?;
                report.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let game = require_game(scope, instance.game_id).await?;
    let now = OffsetDateTime::now_utc();
    instance.current_turn = turn + 1;
    instance.last_turn_processed_at = Some(now);
    instance.next_turn_due_at = Some(now + Duration::hours(i64::from(game.turn_duration_hours)));
    let instance = crud::update::<game_instance::Entity>(scope, instance).await?;

    report.issued = generate_sheets_for_turn(scope, &instance, instance.current_turn).await?;
    info!(
        %game_instance_id,
        turn,
        applied = report.applied,
        failed = report.failed,
        skipped = report.skipped,
        issued = report.issued,
        "Turn processed"
    );
    Ok(report)
}

async fn apply_sheet(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
    sheet: &game_turn_sheet::Model,
) -> Result<(), DomainError> {
    let scanned = sheet
        .scanned_data
        .as_deref()
        .ok_or_else(|| DomainError::required("scanned_data"))?;
    let payload = parse_scan(&sheet.sheet_type, scanned)?;
    let character = sheet_character(scope, sheet).await?;
    match payload {
        ScanPayload::LocationChoice(choice) => {
            move_character(scope, character, sheet, &choice).await
        }
        ScanPayload::JoinGame(_) => enter_world(scope, instance, character).await,
    }
}

/// Character instance a sheet was issued for, locked for update.
async fn sheet_character(
    scope: &Scope<'_>,
    sheet: &game_turn_sheet::Model,
) -> Result<adventure_game_character_instance::Model, DomainError> {
    let scope = scope.unrestricted();
    let link = scope
        .repo::<adventure_game_turn_sheet::Entity>()
        .first(QueryOptions::new().eq("game_turn_sheet_id", sheet.id))
        .await?
        .ok_or_else(|| DomainError::not_found("adventure_game_turn_sheet", sheet.id))?;
    scope
        .repo::<adventure_game_character_instance::Entity>()
        .get_one(link.adventure_game_character_instance_id, Lock::ForUpdateNoWait)
        .await
}

/// Validate the chosen destination against the offered options, the link
/// graph and the link's item requirements, then move.
async fn move_character(
    scope: &Scope<'_>,
    mut character: adventure_game_character_instance::Model,
    sheet: &game_turn_sheet::Model,
    choice: &LocationChoiceScanData,
) -> Result<(), DomainError> {
    let offered: LocationChoiceData = turn_sheet_data::decode("sheet_data", &sheet.sheet_data)?;
    let target = choice.single_choice()?;
    if !offered.offers(target) {
        return Err(DomainError::invalid_field(
            "choices",
            target,
            "location was not offered on this turn sheet",
        ));
    }
    let current = character
        .adventure_game_location_instance_id
        .ok_or_else(|| {
            DomainError::invalid_field(
                "adventure_game_character_instance_id",
                character.id,
                "character has no current location",
            )
        })?;
    if current != offered.current_location_id {
        return Err(DomainError::invalid_field(
            "adventure_game_character_instance_id",
            character.id,
            "character has moved since this turn sheet was issued",
        ));
    }

    let unrestricted = scope.unrestricted();
    let locations = unrestricted.repo::<adventure_game_location_instance::Entity>();
    let from = locations.get_one(current, Lock::None).await?;
    let to = locations.get_one(target, Lock::None).await?;
    if to.game_instance_id != character.game_instance_id {
        return Err(DomainError::invalid_field(
            "choices",
            target,
            "location belongs to a different game instance",
        ));
    }

    let link = unrestricted
        .repo::<adventure_game_location_link::Entity>()
        .first(
            QueryOptions::new()
                .eq("from_adventure_game_location_id", from.adventure_game_location_id)
                .eq("to_adventure_game_location_id", to.adventure_game_location_id),
        )
        .await?
        .ok_or_else(|| {
            DomainError::invalid_field(
                "choices",
                target,
                "no path leads from the current location to the chosen one",
            )
        })?;

    let requirements: Vec<(Uuid, i32)> = unrestricted
        .repo::<adventure_game_location_link_requirement::Entity>()
        .get_many(&QueryOptions::new().eq("adventure_game_location_link_id", link.id))
        .await?
        .into_iter()
        .map(|r| (r.adventure_game_item_id, r.quantity))
        .collect();
    if !requirements.is_empty() {
        let carried: Vec<Uuid> = unrestricted
            .repo::<adventure_game_item_instance::Entity>()
            .get_many(&QueryOptions::new().eq("adventure_game_character_instance_id", character.id))
            .await?
            .into_iter()
            .map(|i| i.adventure_game_item_id)
            .collect();
        let unmet = inventory::unmet_requirements(&requirements, &carried);
        if !unmet.is_empty() {
            return Err(DomainError::invalid_field(
                "choices",
                target,
                format!("'{}' requires items the character does not carry", link.name),
            ));
        }
    }

    character.adventure_game_location_instance_id = Some(target);
    let character =
        crud::update::<adventure_game_character_instance::Entity>(scope, character).await?;
    debug!(
        adventure_game_character_instance_id = %character.id,
        from = %current,
        to = %target,
        "Character moved"
    );
    Ok(())
}

/// Place a newly joined character at the starting location. Characters
/// already in the world are left where they are.
async fn enter_world(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
    mut character: adventure_game_character_instance::Model,
) -> Result<(), DomainError> {
    if character.adventure_game_location_instance_id.is_some() {
        return Ok(());
    }
    let start = starting_location_instance(scope, instance)
        .await?
        .ok_or_else(|| DomainError::internal("game instance has no starting location"))?;
    character.adventure_game_location_instance_id = Some(start.id);
    crud::update::<adventure_game_character_instance::Entity>(scope, character).await?;
    Ok(())
}

/// Issue `turn`'s sheet for every living character. Characters that already
/// hold a sheet for that turn are skipped.
pub(crate) async fn generate_sheets_for_turn(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
    turn: i32,
) -> Result<usize, DomainError> {
    let characters = scope
        .unrestricted()
        .repo::<adventure_game_character_instance::Entity>()
        .get_many(&QueryOptions::new().eq("game_instance_id", instance.id))
        .await?;
    let mut issued = 0;
    for character in characters.iter().filter(|c| c.health > 0) {
        if issue_sheet(scope, instance, character, turn).await?.is_some() {
            issued += 1;
        }
    }
    Ok(issued)
}

/// Issue one character's sheet for `turn`: `location_choice` once the
/// character is in the world, `join_game` before that.
pub(crate) async fn issue_sheet(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
    character: &adventure_game_character_instance::Model,
    turn: i32,
) -> Result<Option<game_turn_sheet::Model>, DomainError> {
    let unrestricted = scope.unrestricted();
    let held: Vec<Uuid> = unrestricted
        .repo::<adventure_game_turn_sheet::Entity>()
        .get_many(&QueryOptions::new().eq("adventure_game_character_instance_id", character.id))
        .await?
        .into_iter()
        .map(|link| link.game_turn_sheet_id)
        .collect();
    if !held.is_empty() {
        let already = unrestricted
            .repo::<game_turn_sheet::Entity>()
            .count(&QueryOptions::new().is_in("id", held).eq("turn_number", turn))
            .await?;
        if already > 0 {
            return Ok(None);
        }
    }

    let definition = unrestricted
        .repo::<adventure_game_character::Entity>()
        .get_one(character.adventure_game_character_id, Lock::None)
        .await?;

    let (kind, sheet_data) = match character.adventure_game_location_instance_id {
        Some(location_instance_id) => (
            SheetType::LocationChoice,
            turn_sheet_data::encode(
                &location_choices(scope, instance, location_instance_id).await?,
            )?,
        ),
        None => {
            let game = require_game(scope, instance.game_id).await?;
            let params = load_parameters(scope, instance).await?;
            let data = JoinGameData {
                game_name: game.name,
                character_name: definition.name.clone(),
                welcome_message: params.get(WELCOME_MESSAGE).cloned().unwrap_or_default(),
            };
            (SheetType::JoinGame, turn_sheet_data::encode(&data)?)
        }
    };

    let now = OffsetDateTime::now_utc();
    let sheet = crud::create::<game_turn_sheet::Entity>(
        scope,
        game_turn_sheet::Model {
            id: Uuid::nil(),
            game_id: instance.game_id,
            game_instance_id: instance.id,
            account_id: definition.account_id,
            turn_number: turn,
            sheet_type: kind.as_str().to_string(),
            sheet_order: kind.sheet_order(),
            sheet_data,
            scanned_data: None,
            scanned_at: None,
            scan_quality: None,
            scanned_by: None,
            is_completed: false,
            completed_at: None,
            processing_status: ProcessingStatus::Pending,
            error_message: None,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        },
    )
    .await?;
    crud::create::<adventure_game_turn_sheet::Entity>(
        scope,
        adventure_game_turn_sheet::Model {
            id: Uuid::nil(),
            game_id: instance.game_id,
            adventure_game_character_instance_id: character.id,
            game_turn_sheet_id: sheet.id,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        },
    )
    .await?;
    debug!(
        game_instance_id = %instance.id,
        turn,
        sheet_id = %sheet.id,
        sheet_type = kind.as_str(),
        "Turn sheet issued"
    );
    Ok(Some(sheet))
}

/// Options are the outgoing links of the current catalog location, pointed
/// at this instance's copies of their destinations.
async fn location_choices(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
    location_instance_id: Uuid,
) -> Result<LocationChoiceData, DomainError> {
    let scope = scope.unrestricted();
    let here = scope
        .repo::<adventure_game_location_instance::Entity>()
        .get_one(location_instance_id, Lock::None)
        .await?;
    let here_def = scope
        .repo::<adventure_game_location::Entity>()
        .get_one(here.adventure_game_location_id, Lock::None)
        .await?;

    let copies: HashMap<Uuid, Uuid> = scope
        .repo::<adventure_game_location_instance::Entity>()
        .get_many(&QueryOptions::new().eq("game_instance_id", instance.id))
        .await?
        .into_iter()
        .map(|l| (l.adventure_game_location_id, l.id))
        .collect();

    let links = scope
        .repo::<adventure_game_location_link::Entity>()
        .get_many(
            &QueryOptions::new()
                .eq("from_adventure_game_location_id", here_def.id)
                .with_sort("name", Order::Asc)
                .with_sort("id", Order::Asc),
        )
        .await?;

    Ok(LocationChoiceData {
        current_location_id: here.id,
        current_location_name: here_def.name,
        location_options: links
            .into_iter()
            .filter_map(|link| {
                copies
                    .get(&link.to_adventure_game_location_id)
                    .map(|&location_id| LocationOption {
                        location_id,
                        label: link.name,
                    })
            })
            .collect(),
    })
}

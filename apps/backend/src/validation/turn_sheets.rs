//! Turn sheet validators.
//!
//! Unknown `sheet_type` values are rejected on create; processing still guards
//! against stored rows with a type it does not understand.

use super::rules;
use super::{Ruleset, Validated};
use crate::domain::sheet_status;
use crate::domain::turn_sheet_data::SheetType;
use crate::entities::{adventure_game_turn_sheet, game_turn_sheet, ProcessingStatus};
use crate::errors::domain::DomainError;

fn sheet_fields(rec: &game_turn_sheet::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id("game_instance_id", rec.game_instance_id)?;
    rules::required_id("account_id", rec.account_id)?;
    rules::non_negative("turn_number", rec.turn_number)?;
    SheetType::parse(&rec.sheet_type)?;
    if let Some(quality) = rec.scan_quality {
        sheet_status::check_quality(quality)?;
    }
    if let Some(scanner) = &rec.scanned_by {
        rules::max_len("scanned_by", scanner, rules::NAME_MAX)?;
    }
    if rec.is_completed != rec.completed_at.is_some() {
        return Err(DomainError::invalid_field(
            "completed_at",
            rec.is_completed,
            "completion flag and timestamp must agree",
        ));
    }
    if rec.processing_status == ProcessingStatus::Error && rec.error_message.is_none() {
        return Err(DomainError::required("error_message"));
    }
    Ok(())
}

fn sheet_fixed(
    curr: &game_turn_sheet::Model,
    next: &game_turn_sheet::Model,
) -> Result<(), DomainError> {
    rules::immutable_id("game_instance_id", curr.game_instance_id, next.game_instance_id)?;
    rules::immutable_id("account_id", curr.account_id, next.account_id)?;
    rules::immutable("turn_number", &curr.turn_number, &next.turn_number)?;
    rules::immutable("sheet_type", &curr.sheet_type, &next.sheet_type)
}

impl Validated for game_turn_sheet::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[sheet_fields],
        updates: &[sheet_fixed],
        deletes: &[],
    };
}

fn adventure_sheet_fields(rec: &adventure_game_turn_sheet::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    rules::required_id(
        "adventure_game_character_instance_id",
        rec.adventure_game_character_instance_id,
    )?;
    rules::required_id("game_turn_sheet_id", rec.game_turn_sheet_id)
}

impl Validated for adventure_game_turn_sheet::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[adventure_sheet_fields],
        updates: &[],
        deletes: &[],
    };
}

//! Game image metadata checks.
//!
//! Field rules run through the ruleset; size and dimension limits depend on
//! [`EngineConfig`] and are applied by [`validate_image`].

use super::rules;
use super::{Ruleset, Validated};
use crate::config::engine::EngineConfig;
use crate::domain::readiness::{ReadinessIssue, Severity};
use crate::domain::turn_sheet_data::SheetType;
use crate::entities::{game_image, GameImageType};
use crate::errors::domain::DomainError;

pub const ALLOWED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Long edge over short edge for ISO 216 paper.
const A4_RATIO: f64 = std::f64::consts::SQRT_2;
const A4_TOLERANCE: f64 = 0.05;

fn image_fields(rec: &game_image::Model) -> Result<(), DomainError> {
    rules::required_id("game_id", rec.game_id)?;
    if !ALLOWED_MIME_TYPES.contains(&rec.mime_type.as_str()) {
        return Err(DomainError::invalid_field(
            "mime_type",
            &rec.mime_type,
            "unsupported image format",
        ));
    }
    match (rec.image_type, rec.turn_sheet_type.as_deref()) {
        (GameImageType::TurnSheetBackground, None) => {
            return Err(DomainError::required("turn_sheet_type"))
        }
        (GameImageType::TurnSheetBackground, Some(kind)) => {
            SheetType::parse(kind).map_err(|_| {
                DomainError::invalid_field("turn_sheet_type", kind, "unknown turn sheet type")
            })?;
        }
    }
    rules::positive("file_size", rec.file_size)?;
    rules::positive("width", rec.width)?;
    rules::positive("height", rec.height)
}

fn image_fixed(curr: &game_image::Model, next: &game_image::Model) -> Result<(), DomainError> {
    rules::immutable_id("game_id", curr.game_id, next.game_id)
}

impl Validated for game_image::Model {
    const RULES: Ruleset<Self> = Ruleset {
        creates: &[image_fields],
        updates: &[image_fixed],
        deletes: &[],
    };
}

/// Enforce configured limits. Returns warnings (currently only the A4 aspect
/// check) when the image is otherwise acceptable.
pub fn validate_image(
    rec: &game_image::Model,
    config: &EngineConfig,
) -> Result<Vec<ReadinessIssue>, DomainError> {
    super::validate_for_create(rec)?;

    if rec.file_size > config.max_image_bytes {
        return Err(DomainError::invalid_field(
            "file_size",
            rec.file_size,
            format!("image exceeds the {} byte limit", config.max_image_bytes),
        ));
    }

    let b = &config.image_bounds;
    if rec.width < b.min_width || rec.width > b.max_width {
        return Err(DomainError::invalid_field(
            "width",
            rec.width,
            format!("width must be between {} and {} pixels", b.min_width, b.max_width),
        ));
    }
    if rec.height < b.min_height || rec.height > b.max_height {
        return Err(DomainError::invalid_field(
            "height",
            rec.height,
            format!("height must be between {} and {} pixels", b.min_height, b.max_height),
        ));
    }

    let mut warnings = Vec::new();
    let (long, short) = if rec.height >= rec.width {
        (rec.height, rec.width)
    } else {
        (rec.width, rec.height)
    };
    let ratio = f64::from(long) / f64::from(short);
    if (ratio - A4_RATIO).abs() / A4_RATIO > A4_TOLERANCE {
        warnings.push(ReadinessIssue {
            field: "dimensions".to_string(),
            severity: Severity::Warning,
            message: format!(
                "{}x{} is not A4 proportioned; the background may be stretched",
                rec.width, rec.height
            ),
        });
    }
    Ok(warnings)
}

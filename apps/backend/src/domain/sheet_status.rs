//! Per-sheet processing state machine: `pending -> scanned -> completed`, with
//! `error` reachable from anywhere.

use crate::entities::ProcessingStatus;
use crate::errors::domain::DomainError;

pub fn status_name(status: ProcessingStatus) -> &'static str {
    match status {
        ProcessingStatus::Pending => "pending",
        ProcessingStatus::Scanned => "scanned",
        ProcessingStatus::Completed => "completed",
        ProcessingStatus::Error => "error",
    }
}

fn expect(current: ProcessingStatus, wanted: ProcessingStatus, action: &str) -> Result<(), DomainError> {
    if current != wanted {
        return Err(DomainError::invalid_field(
            "processing_status",
            status_name(current),
            format!("{action} requires a {} turn sheet", status_name(wanted)),
        ));
    }
    Ok(())
}

pub fn check_mark_scanned(current: ProcessingStatus) -> Result<(), DomainError> {
    expect(current, ProcessingStatus::Pending, "marking scanned")
}

pub fn check_mark_completed(current: ProcessingStatus) -> Result<(), DomainError> {
    expect(current, ProcessingStatus::Scanned, "marking completed")
}

/// Scanner confidence must be a finite value in `[0, 1]`.
pub fn check_quality(quality: f64) -> Result<(), DomainError> {
    if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
        return Err(DomainError::invalid_field(
            "scan_quality",
            quality,
            "must be between 0 and 1",
        ));
    }
    Ok(())
}

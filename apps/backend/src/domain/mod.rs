//! Domain layer: pure game rules over entity rows (no I/O).

pub mod instance_status;
pub mod inventory;
pub mod parameters;
pub mod readiness;
pub mod sheet_status;
pub mod tokens;
pub mod turn_sheet_data;

pub use readiness::{ReadinessIssue, Severity};
pub use turn_sheet_data::{ScanPayload, SheetType};

use crate::entities::GameInstanceStatus;
use crate::errors::domain::DomainError;

/// Allowed status moves for a game instance. `Completed` and `Cancelled` are terminal.
pub fn can_transition(from: GameInstanceStatus, to: GameInstanceStatus) -> bool {
    use GameInstanceStatus::{Cancelled, Completed, Created, Paused, Started};

    matches!(
        (from, to),
        (Created, Started)
            | (Created, Cancelled)
            | (Started, Paused)
            | (Started, Completed)
            | (Started, Cancelled)
            | (Paused, Started)
            | (Paused, Completed)
            | (Paused, Cancelled)
    )
}

pub fn is_terminal(status: GameInstanceStatus) -> bool {
    matches!(
        status,
        GameInstanceStatus::Completed | GameInstanceStatus::Cancelled
    )
}

/// `Ok` for an unchanged status or an allowed move.
pub fn check_transition(from: GameInstanceStatus, to: GameInstanceStatus) -> Result<(), DomainError> {
    if from == to || can_transition(from, to) {
        return Ok(());
    }
    Err(DomainError::invalid_field(
        "status",
        status_name(to),
        format!(
            "cannot move a game instance from {} to {}",
            status_name(from),
            status_name(to)
        ),
    ))
}

pub fn status_name(status: GameInstanceStatus) -> &'static str {
    match status {
        GameInstanceStatus::Created => "created",
        GameInstanceStatus::Started => "started",
        GameInstanceStatus::Paused => "paused",
        GameInstanceStatus::Completed => "completed",
        GameInstanceStatus::Cancelled => "cancelled",
    }
}

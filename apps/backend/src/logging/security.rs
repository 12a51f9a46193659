use tracing::warn;
use uuid::Uuid;

use crate::logging::pii::Redacted;

/// Log a rejected turn sheet token.
pub fn token_rejected(game_subscription_instance_id: Uuid, reason: &str) {
    warn!(
        event = "SECURITY_TURN_SHEET_TOKEN_REJECTED",
        %game_subscription_instance_id,
        reason,
        "Turn sheet token verification failed"
    );
}

/// Log a subscription approval attempted with the wrong email.
pub fn approval_email_mismatch(game_subscription_id: Uuid, email: &str) {
    warn!(
        event = "SECURITY_APPROVAL_EMAIL_MISMATCH",
        %game_subscription_id,
        email = %Redacted(email),
        "Subscription approval email does not match owning account"
    );
}

//! Turn sheet token freshness.

use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No token has been minted for the link
    Missing,
    /// Presented token is not the current one (rotated or forged)
    Mismatch,
    Expired,
}

impl TokenRejection {
    pub fn reason(self) -> &'static str {
        match self {
            Self::Missing => "no turn sheet token has been issued",
            Self::Mismatch => "turn sheet token does not match",
            Self::Expired => "turn sheet token has expired",
        }
    }
}

/// Valid iff `presented` equals the stored token and the expiry is still ahead of `now`.
pub fn verify(
    stored: Option<Uuid>,
    expires_at: Option<OffsetDateTime>,
    presented: Uuid,
    now: OffsetDateTime,
) -> Result<(), TokenRejection> {
    let (Some(stored), Some(expires_at)) = (stored, expires_at) else {
        return Err(TokenRejection::Missing);
    };
    if stored.as_bytes() != presented.as_bytes() {
        return Err(TokenRejection::Mismatch);
    }
    if expires_at <= now {
        return Err(TokenRejection::Expired);
    }
    Ok(())
}

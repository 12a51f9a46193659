//! Collision-free fixture values.
//!
//! Tests may share a Postgres database, so names and emails that hit unique
//! indexes carry a ULID suffix.

use ulid::Ulid;

/// `{prefix}-{ulid}`
///
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let a = unique_str("castle");
/// assert!(a.starts_with("castle-"));
/// assert_ne!(a, unique_str("castle"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// Lowercase `{prefix}-{ulid}@example.test`, matching how accounts store emails.
///
/// ```
/// use backend_test_support::unique_helpers::unique_email;
///
/// let email = unique_email("Player");
/// assert!(email.starts_with("player-"));
/// assert!(email.ends_with("@example.test"));
/// ```
pub fn unique_email(prefix: &str) -> String {
    unique_str(prefix).to_lowercase() + "@example.test"
}

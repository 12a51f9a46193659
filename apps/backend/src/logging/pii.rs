use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Regex registry for values that must never reach logs verbatim.
pub struct PiiRegexRegistry;

impl PiiRegexRegistry {
    /// Email addresses (account, account user and approval emails)
    pub fn email() -> &'static Regex {
        static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
        });
        &EMAIL_REGEX
    }

    /// Hyphenated UUIDs; turn sheet tokens use this shape
    pub fn uuid_token() -> &'static Regex {
        static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(
                r"\b[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\b",
            )
            .unwrap()
        });
        &UUID_REGEX
    }
}

/// Masks emails (first character of the local part survives) and UUID-shaped tokens.
pub fn redact(input: &str) -> String {
    let email_redacted = PiiRegexRegistry::email().replace_all(input, |caps: &regex::Captures| {
        let full_match = &caps[0];
        match full_match.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                format!("{}***@{domain}", &local[..1])
            }
            _ => full_match.to_string(),
        }
    });

    PiiRegexRegistry::uuid_token()
        .replace_all(&email_redacted, "[REDACTED_TOKEN]")
        .to_string()
}

/// Display wrapper applying [`redact`] when formatted.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

//! Validated path segments for the webhook and bot routes.
//!
//! ```text
//! POST /webhook/{provider_name}
//! POST /bot/{provider_name}/commands
//! POST /bot/{provider_name}/events[/{secure_token}]
//! ```
//!
//! A segment that fails validation means the route does not exist; it is
//! rendered as a 404, not as an unknown provider.

// ============================================================================
// ProviderName
// ============================================================================

/// Provider segment of a webhook or bot route.
///
/// Must be non-empty and consist of lowercase ASCII letters only.
///
/// ```rust
/// use git_slacker_api::provider::ProviderName;
///
/// assert_eq!(ProviderName::new("github").unwrap().as_str(), "github");
/// assert!(ProviderName::new("GitHub").is_err());
/// assert!(ProviderName::new("git-hub").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderName(String);

impl ProviderName {
    /// Repository host webhooks
    pub const GITHUB: &'static str = "github";
    /// Slack bot commands and events
    pub const SLACK: &'static str = "slack";
    /// Telegram bot events
    pub const TELEGRAM: &'static str = "telegram";

    pub fn new(value: impl Into<String>) -> Result<Self, InvalidSegmentError> {
        let value = value.into();
        validate("provider_name", &value, |c| c.is_ascii_lowercase())?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SecureToken
// ============================================================================

/// Token segment of the Telegram events route.
///
/// Must be non-empty and consist of ASCII letters and digits only.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureToken(String);

impl SecureToken {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidSegmentError> {
        let value = value.into();
        validate("secure_token", &value, |c| c.is_ascii_alphanumeric())?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SecureToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecureToken").field(&"<REDACTED>").finish()
    }
}

fn validate(
    segment: &'static str,
    value: &str,
    allowed: impl Fn(char) -> bool,
) -> Result<(), InvalidSegmentError> {
    if value.is_empty() {
        return Err(InvalidSegmentError::Empty { segment });
    }
    if !value.chars().all(allowed) {
        return Err(InvalidSegmentError::InvalidChars {
            segment,
            value: value.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// InvalidSegmentError
// ============================================================================

/// Error returned when a path segment cannot be validated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSegmentError {
    #[error("Path segment '{segment}' must not be empty")]
    Empty { segment: &'static str },

    #[error("Path segment '{segment}' contains invalid characters: '{value}'")]
    InvalidChars {
        segment: &'static str,
        value: String,
    },
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;

//! Shared secrets loaded once at startup.

use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret string that is wiped from memory when dropped
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretValue {
    inner: String,
}

impl SecretValue {
    /// Create secret value from string
    pub fn from_string(value: String) -> Self {
        Self { inner: value }
    }

    /// Get secret as string (only for immediate use)
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Get secret as bytes
    pub fn expose_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get secret length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::from_string(value.to_string())
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Credentials used to authenticate inbound webhooks and outbound bot calls.
///
/// Field names match the lower-cased environment variables they are read from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Secrets {
    /// `GITHUB_WEBHOOK_SECRET`: HMAC key for `X-Hub-Signature`
    pub github_webhook_secret: SecretValue,
    /// `SLACK_WEBHOOK_TOKEN`: verification token carried in Slack payloads
    pub slack_webhook_token: SecretValue,
    /// `TELEGRAM_WEBHOOK_TOKEN`: token carried in the Telegram webhook path
    pub telegram_webhook_token: SecretValue,
    /// `SLACK_BOT_TOKEN`: bearer token for outbound Slack messages
    pub slack_bot_token: SecretValue,
    /// `TELEGRAM_TOKEN`: bot token for outbound Telegram messages
    pub telegram_token: SecretValue,
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;

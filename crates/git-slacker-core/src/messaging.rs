//! Outbound chat delivery contract.
//!
//! The core only decides *what* to send; a [`ChatTransport`] implementation
//! supplied at startup performs the network call.

use crate::DeliveryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat platforms the relay can post to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatPlatform {
    Slack,
    Telegram,
}

impl ChatPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "Slack",
            Self::Telegram => "Telegram",
        }
    }
}

impl fmt::Display for ChatPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends a text message to a chat recipient
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post `message` to `recipient` (a channel, user or chat id) on `platform`
    async fn send_message(
        &self,
        platform: ChatPlatform,
        recipient: &str,
        message: &str,
    ) -> Result<(), DeliveryError>;
}

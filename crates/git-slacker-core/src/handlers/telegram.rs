//! Handler for the Telegram bot endpoint and outbound Telegram messages.

use super::{dispatch_log, misrouted};
use crate::bus::{CommandBus, CommandHandler, Outcome};
use crate::command::{missing_field, Command, CommandFactory, CommandKind, Severity};
use crate::messaging::{ChatPlatform, ChatTransport};
use crate::verification::SharedTokenVerifier;
use crate::{AuthenticationError, RelayResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Checks the secure token Telegram carries in the webhook URL path
pub struct TelegramHandler {
    commands: Arc<CommandFactory>,
    verifier: SharedTokenVerifier,
    transport: Arc<dyn ChatTransport>,
}

impl TelegramHandler {
    /// Handler id used by the routing table
    pub const ID: &'static str = "Telegram";

    pub fn new(
        commands: Arc<CommandFactory>,
        verifier: SharedTokenVerifier,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            commands,
            verifier,
            transport,
        }
    }

    async fn validate_token(
        &self,
        bus: &CommandBus,
        secure_token: Option<&str>,
    ) -> RelayResult<()> {
        let token = secure_token.unwrap_or_default();
        if token.is_empty() {
            dispatch_log(
                bus,
                &self.commands,
                Severity::Warning,
                "Telegram:BOT: Empty secure token",
                Map::new(),
            )
            .await?;
            return Err(AuthenticationError::EmptySecureToken.into());
        }

        if !self.verifier.verify(token) {
            let mut context = Map::new();
            context.insert("secureToken".to_string(), Value::String(token.to_string()));
            dispatch_log(
                bus,
                &self.commands,
                Severity::Warning,
                "Telegram:BOT: Invalid secure token",
                context,
            )
            .await?;
            return Err(AuthenticationError::InvalidSecureToken.into());
        }

        Ok(())
    }

    async fn send_message(
        &self,
        message: Option<String>,
        recipient: Option<String>,
    ) -> RelayResult<Outcome> {
        const KIND: CommandKind = CommandKind::TelegramSendMessage;
        let message = message.ok_or_else(|| missing_field(KIND, "message"))?;
        let recipient = recipient.ok_or_else(|| missing_field(KIND, "recipient"))?;

        self.transport
            .send_message(ChatPlatform::Telegram, &recipient, &message)
            .await?;
        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl CommandHandler for TelegramHandler {
    #[instrument(skip_all, fields(command = %command.kind()))]
    async fn handle(&self, command: Command, bus: &CommandBus) -> RelayResult<Outcome> {
        match command {
            Command::TelegramEvents(command) => {
                self.validate_token(bus, command.secure_token.as_deref())
                    .await?;
                dispatch_log(bus, &self.commands, Severity::Debug, "events", command.payload)
                    .await?;
                Ok(Outcome::Completed)
            }
            Command::TelegramSendMessage(command) => {
                self.send_message(command.message, command.recipient).await
            }
            other => Err(misrouted(Self::ID, other.kind())),
        }
    }
}

#[cfg(test)]
#[path = "telegram_tests.rs"]
mod tests;

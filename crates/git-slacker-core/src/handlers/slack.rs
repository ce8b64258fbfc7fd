//! Handler for the Slack bot endpoints and outbound Slack messages.

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

/// Checks the verification token Slack embeds in every payload
pub struct SlackHandler {
    commands: Arc<CommandFactory>,
    verifier: SharedTokenVerifier,
    transport: Arc<dyn ChatTransport>,
}

impl SlackHandler {
    /// Handler id used by the routing table
    pub const ID: &'static str = "Slack";

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

    async fn validate_payload(
        &self,
        bus: &CommandBus,
        endpoint: &str,
        payload: &Map<String, Value>,
    ) -> RelayResult<()> {
        let Some(token) = payload.get("token").and_then(Value::as_str) else {
            dispatch_log(
                bus,
                &self.commands,
                Severity::Warning,
                format!("Slack:BOT->{endpoint}: Invalid request format"),
                payload.clone(),
            )
            .await?;
            return Err(AuthenticationError::InvalidRequestFormat.into());
        };

        if !self.verifier.verify(token) {
            dispatch_log(
                bus,
                &self.commands,
                Severity::Warning,
                format!("Slack:BOT->{endpoint}: Invalid request signature: {token}"),
                payload.clone(),
            )
            .await?;
            return Err(AuthenticationError::InvalidRequestSignature.into());
        }

        Ok(())
    }

    async fn handle_payload(
        &self,
        bus: &CommandBus,
        endpoint: &str,
        payload: Map<String, Value>,
    ) -> RelayResult<Outcome> {
        self.validate_payload(bus, endpoint, &payload).await?;

        dispatch_log(
            bus,
            &self.commands,
            Severity::Debug,
            endpoint.to_lowercase(),
            payload,
        )
        .await?;
        Ok(Outcome::Completed)
    }

    async fn send_message(
        &self,
        message: Option<String>,
        recipient: Option<String>,
    ) -> RelayResult<Outcome> {
        const KIND: CommandKind = CommandKind::SlackSendMessage;
        let message = message.ok_or_else(|| missing_field(KIND, "message"))?;
        let recipient = recipient.ok_or_else(|| missing_field(KIND, "recipient"))?;

        self.transport
            .send_message(ChatPlatform::Slack, &recipient, &message)
            .await?;
        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl CommandHandler for SlackHandler {
    #[instrument(skip_all, fields(command = %command.kind()))]
    async fn handle(&self, command: Command, bus: &CommandBus) -> RelayResult<Outcome> {
        match command {
            Command::SlackCommands(command) => {
                self.handle_payload(bus, "Commands", command.payload).await
            }
            Command::SlackEvents(command) => {
                self.handle_payload(bus, "Events", command.payload).await
            }
            Command::SlackSendMessage(command) => {
                self.send_message(command.message, command.recipient).await
            }
            other => Err(misrouted(Self::ID, other.kind())),
        }
    }
}

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;

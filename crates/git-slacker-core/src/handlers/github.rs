//! Handler for GitHub webhooks.

use super::{dispatch_log, misrouted};
use crate::bus::{CommandBus, CommandHandler, Outcome};
use crate::command::{Command, CommandFactory, GitHubWebHook, Severity};
use crate::event::{EventEmitter, EventFactory, EventKind};
use crate::verification::{HubSignatureVerifier, SignatureCheck};
use crate::{AuthenticationError, RelayResult};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::instrument;

/// Verifies `X-Hub-Signature` and broadcasts a `WebHook/Received` event.
///
/// No event is emitted unless the signature matches.
pub struct GitHubHandler {
    commands: Arc<CommandFactory>,
    events: Arc<EventFactory>,
    emitter: Arc<EventEmitter>,
    verifier: HubSignatureVerifier,
}

impl GitHubHandler {
    /// Handler id used by the routing table
    pub const ID: &'static str = "GitHub";

    /// Provider name carried by emitted events
    pub const PROVIDER_NAME: &'static str = "GitHub";

    pub fn new(
        commands: Arc<CommandFactory>,
        events: Arc<EventFactory>,
        emitter: Arc<EventEmitter>,
        verifier: HubSignatureVerifier,
    ) -> Self {
        Self {
            commands,
            events,
            emitter,
            verifier,
        }
    }

    async fn handle_webhook(
        &self,
        webhook: GitHubWebHook,
        bus: &CommandBus,
    ) -> RelayResult<Outcome> {
        let (Some(event_name), Some(request_signature)) = (
            webhook.event_name.filter(|v| !v.is_empty()),
            webhook.request_signature.filter(|v| !v.is_empty()),
        ) else {
            dispatch_log(
                bus,
                &self.commands,
                Severity::Warning,
                "GitHub:WebHook->Callback: Invalid request format",
                webhook.payload,
            )
            .await?;
            return Err(AuthenticationError::InvalidRequestFormat.into());
        };

        if let SignatureCheck::Mismatch { computed } =
            self.verifier.verify(&webhook.raw, &request_signature)?
        {
            let mut context = Map::new();
            context.insert("signature".to_string(), Value::String(computed));
            context.insert("requestSignature".to_string(), json!(request_signature));
            context.insert("payload".to_string(), Value::Object(webhook.payload));

            dispatch_log(
                bus,
                &self.commands,
                Severity::Warning,
                "GitHub:WebHook->Callback: Invalid request signature",
                context,
            )
            .await?;
            return Err(AuthenticationError::InvalidRequestSignature.into());
        }

        let event = self.events.create(
            EventKind::WebHookReceived.name(),
            Self::PROVIDER_NAME,
            &event_name,
            webhook.payload,
        )?;
        self.emitter.emit(&event).await?;

        Ok(Outcome::Completed)
    }
}

#[async_trait]
impl CommandHandler for GitHubHandler {
    #[instrument(skip_all, fields(command = %command.kind()))]
    async fn handle(&self, command: Command, bus: &CommandBus) -> RelayResult<Outcome> {
        match command {
            Command::GitHubWebHook(webhook) => self.handle_webhook(webhook, bus).await,
            other => Err(misrouted(Self::ID, other.kind())),
        }
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;

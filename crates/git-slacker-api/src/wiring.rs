//! Startup wiring of factories, handlers and listeners into an [`AppState`].

use crate::config::ServiceConfig;
use crate::AppState;
use git_slacker_core::handlers::{
    GitHubHandler, LogHandler, ResponseHandler, SlackHandler, TelegramHandler,
};
use git_slacker_core::listeners::WebHookListenerProvider;
use git_slacker_core::verification::{HubSignatureVerifier, SharedTokenVerifier};
use git_slacker_core::{
    ChatTransport, CommandBus, CommandFactory, EventEmitter, EventFactory, RoutingTable, Secrets,
};
use std::sync::Arc;
use tracing::info;

/// Build the relay: routing table, listener bindings and one handler per
/// command namespace.
///
/// The routing table is read from `boot.handlers_cache` when it is current;
/// received webhooks are persisted under `storage.event_directory` when set.
pub async fn build_state(
    config: ServiceConfig,
    secrets: &Secrets,
    transport: Arc<dyn ChatTransport>,
) -> AppState {
    let routes = RoutingTable::load_or_derive(config.boot.handlers_cache.as_deref()).await;

    let mut listeners = WebHookListenerProvider::new();
    if let Some(directory) = &config.storage.event_directory {
        listeners = listeners.with_event_directory(directory.clone());
    }
    let emitter = Arc::new(
        EventEmitter::builder()
            .use_listener_provider(&listeners)
            .build(),
    );

    let commands = Arc::new(CommandFactory::new());
    let events = Arc::new(EventFactory::new());

    let github = GitHubHandler::new(
        commands.clone(),
        events,
        emitter.clone(),
        HubSignatureVerifier::new(secrets.github_webhook_secret.clone()),
    );
    let slack = SlackHandler::new(
        commands.clone(),
        SharedTokenVerifier::new(secrets.slack_webhook_token.clone()),
        transport.clone(),
    );
    let telegram = TelegramHandler::new(
        commands.clone(),
        SharedTokenVerifier::new(secrets.telegram_webhook_token.clone()),
        transport,
    );

    let bus = CommandBus::builder(routes)
        .register(GitHubHandler::ID, Arc::new(github))
        .register(SlackHandler::ID, Arc::new(slack))
        .register(TelegramHandler::ID, Arc::new(telegram))
        .register(LogHandler::ID, Arc::new(LogHandler::new()))
        .register(ResponseHandler::ID, Arc::new(ResponseHandler::new()))
        .build();

    info!(
        routes = bus.routes().routes().len(),
        fingerprint = %bus.routes().fingerprint(),
        listeners = ?emitter.manifest(),
        "Relay wired"
    );

    AppState::new(config, commands, Arc::new(bus), emitter)
}

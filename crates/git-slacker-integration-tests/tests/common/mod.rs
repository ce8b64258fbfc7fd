//! Common test utilities for git-slacker integration tests
//!
//! This module provides:
//! - Recording implementations of the relay seams (chat transport, log
//!   handler, event listener)
//! - A fully wired relay built from the public APIs
//! - Request builders and response helpers

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use git_slacker_api::{create_router, AppState, ServiceConfig};
use git_slacker_core::command::LogEntry;
use git_slacker_core::handlers::{
    GitHubHandler, ResponseHandler, SlackHandler, TelegramHandler,
};
use git_slacker_core::listeners::{FilesystemEventStore, WebHookListenerProvider, WebHookRecord};
use git_slacker_core::verification::{HubSignatureVerifier, SharedTokenVerifier};
use git_slacker_core::{
    ChatPlatform, ChatTransport, Command, CommandBus, CommandFactory, CommandHandler,
    DeliveryError, DomainEvent, EventEmitter, EventFactory, EventKind, LazyListener, Listener,
    Outcome, RelayResult, RoutingTable, SecretValue, Secrets, Severity,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const GITHUB_SECRET: &str = "hooksecret";
pub const SLACK_TOKEN: &str = "slackverification";
pub const TELEGRAM_TOKEN: &str = "telegramtoken";

// ============================================================================
// Recording Chat Transport
// ============================================================================

/// A message handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub platform: ChatPlatform,
    pub recipient: String,
    pub message: String,
}

/// Records outbound messages instead of delivering them
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    reject_with: Arc<Mutex<Option<String>>>,
}

impl RecordingTransport {
    #[allow(dead_code)]
    pub fn reject_with(&self, reason: &str) {
        *self.reject_with.lock().unwrap() = Some(reason.to_string());
    }

    #[allow(dead_code)]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        platform: ChatPlatform,
        recipient: &str,
        message: &str,
    ) -> Result<(), DeliveryError> {
        if let Some(reason) = self.reject_with.lock().unwrap().clone() {
            return Err(DeliveryError::Rejected {
                platform: platform.to_string(),
                message: reason,
            });
        }

        self.sent.lock().unwrap().push(SentMessage {
            platform,
            recipient: recipient.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Recording Log Handler
// ============================================================================

/// Stands in for the log handler and keeps every `Log/*` command
#[derive(Clone, Default)]
pub struct RecordingLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLog {
    #[allow(dead_code)]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn warnings(&self) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.severity == Severity::Warning)
            .collect()
    }
}

#[async_trait]
impl CommandHandler for RecordingLog {
    async fn handle(&self, command: Command, _bus: &CommandBus) -> RelayResult<Outcome> {
        if let Command::Log(entry) = command {
            self.entries.lock().unwrap().push(entry);
        }
        Ok(Outcome::Completed)
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

/// Keeps every emitted domain event
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingListener {
    #[allow(dead_code)]
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Listener for RecordingListener {
    async fn handle(&self, event: &DomainEvent) -> RelayResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

// ============================================================================
// Relay Fixture
// ============================================================================

/// A relay wired like production, with recording seams and a temporary
/// event directory
#[allow(dead_code)]
pub struct TestRelay {
    pub router: Router,
    pub state: AppState,
    pub log: RecordingLog,
    pub listener: RecordingListener,
    pub transport: RecordingTransport,
    pub events_dir: TempDir,
}

#[allow(dead_code)]
impl TestRelay {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let secrets = test_secrets();
        let events_dir = TempDir::new().unwrap();
        let log = RecordingLog::default();
        let listener = RecordingListener::default();
        let transport = RecordingTransport::default();

        let provider = WebHookListenerProvider::new().with_event_directory(events_dir.path());
        let emitter = Arc::new(
            EventEmitter::builder()
                .use_listener_provider(&provider)
                .add_listener(
                    EventKind::WebHookReceived,
                    LazyListener::ready("Test/Recorder", Arc::new(listener.clone())),
                )
                .build(),
        );

        let commands = Arc::new(CommandFactory::new());
        let chat: Arc<dyn ChatTransport> = Arc::new(transport.clone());

        let github = GitHubHandler::new(
            commands.clone(),
            Arc::new(EventFactory::new()),
            emitter.clone(),
            HubSignatureVerifier::new(secrets.github_webhook_secret.clone()),
        );
        let slack = SlackHandler::new(
            commands.clone(),
            SharedTokenVerifier::new(secrets.slack_webhook_token.clone()),
            chat.clone(),
        );
        let telegram = TelegramHandler::new(
            commands.clone(),
            SharedTokenVerifier::new(secrets.telegram_webhook_token.clone()),
            chat,
        );

        let bus = CommandBus::builder(RoutingTable::catalogue())
            .register(GitHubHandler::ID, Arc::new(github))
            .register(SlackHandler::ID, Arc::new(slack))
            .register(TelegramHandler::ID, Arc::new(telegram))
            .register("Log", Arc::new(log.clone()))
            .register(ResponseHandler::ID, Arc::new(ResponseHandler::new()))
            .build();

        let state = AppState::new(config, commands, Arc::new(bus), emitter);

        Self {
            router: create_router(state.clone()),
            state,
            log,
            listener,
            transport,
            events_dir,
        }
    }

    /// Send one request through a fresh clone of the router
    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::ServiceExt;

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Records written by the persistence listener
    pub async fn persisted(&self) -> Vec<WebHookRecord> {
        FilesystemEventStore::new(self.events_dir.path())
            .await
            .unwrap()
            .read_all()
            .await
            .unwrap()
    }
}

pub fn test_secrets() -> Secrets {
    Secrets {
        github_webhook_secret: SecretValue::from(GITHUB_SECRET),
        slack_webhook_token: SecretValue::from(SLACK_TOKEN),
        telegram_webhook_token: SecretValue::from(TELEGRAM_TOKEN),
        ..Default::default()
    }
}

// ============================================================================
// Request Builders
// ============================================================================

/// `X-Hub-Signature` value for `body` under the test secret
#[allow(dead_code)]
pub fn sign(body: &str) -> String {
    HubSignatureVerifier::new(SecretValue::from(GITHUB_SECRET))
        .sign(body.as_bytes())
        .unwrap()
}

/// A GitHub delivery with optional event and signature headers
#[allow(dead_code)]
pub fn github_request(event: Option<&str>, signature: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook/github")
        .header("content-type", "application/json");
    if let Some(event) = event {
        builder = builder.header("x-github-event", event);
    }
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

//! Tests for command routing through the bus.

use super::*;
use crate::command::Severity;
use crate::RelayError;
use std::sync::Mutex;

/// Records the kinds it receives and optionally dispatches a follow-up command
struct RecordingHandler {
    seen: Arc<Mutex<Vec<CommandKind>>>,
    follow_up: Option<CommandKind>,
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn handle(&self, command: Command, bus: &CommandBus) -> RelayResult<Outcome> {
        self.seen.lock().unwrap().push(command.kind());
        if let Some(kind) = self.follow_up {
            bus.dispatch(kind.instantiate()).await?;
        }
        Ok(Outcome::Completed)
    }
}

fn recorder(seen: &Arc<Mutex<Vec<CommandKind>>>) -> Arc<RecordingHandler> {
    Arc::new(RecordingHandler {
        seen: seen.clone(),
        follow_up: None,
    })
}

#[tokio::test]
async fn test_dispatch_routes_to_namespace_handler() {
    let github_seen = Arc::new(Mutex::new(Vec::new()));
    let log_seen = Arc::new(Mutex::new(Vec::new()));
    let bus = CommandBus::builder(RoutingTable::catalogue())
        .register("GitHub", recorder(&github_seen))
        .register("Log", recorder(&log_seen))
        .build();

    bus.dispatch(CommandKind::Log(Severity::Info).instantiate())
        .await
        .unwrap();
    bus.dispatch(CommandKind::GitHubWebHook.instantiate())
        .await
        .unwrap();
    bus.dispatch(CommandKind::Log(Severity::Debug).instantiate())
        .await
        .unwrap();

    assert_eq!(*github_seen.lock().unwrap(), vec![CommandKind::GitHubWebHook]);
    assert_eq!(
        *log_seen.lock().unwrap(),
        vec![
            CommandKind::Log(Severity::Info),
            CommandKind::Log(Severity::Debug)
        ]
    );
}

#[tokio::test]
async fn test_dispatch_without_handler_is_routing_error() {
    let bus = CommandBus::builder(RoutingTable::catalogue()).build();

    let error = bus
        .dispatch(CommandKind::SlackEvents.instantiate())
        .await
        .unwrap_err();

    match error {
        RelayError::Routing(RoutingError::NoHandler { command }) => {
            assert_eq!(command, "Slack/Events");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!bus.has_handler(CommandKind::SlackEvents));
}

#[tokio::test]
async fn test_dispatch_without_route_is_routing_error() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bus = CommandBus::builder(RoutingTable::derive(&[CommandKind::GitHubWebHook]))
        .register("Log", recorder(&seen))
        .build();

    let result = bus
        .dispatch(CommandKind::Log(Severity::Info).instantiate())
        .await;

    assert!(matches!(
        result,
        Err(RelayError::Routing(RoutingError::NoHandler { .. }))
    ));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_handler_error_propagates_unchanged() {
    let mut handler = MockCommandHandler::new();
    handler.expect_handle().times(1).returning(|_, _| {
        Err(RelayError::Internal {
            message: "boom".to_string(),
        })
    });
    let bus = CommandBus::builder(RoutingTable::catalogue())
        .register("Response", Arc::new(handler))
        .build();

    let error = bus
        .dispatch(CommandKind::SuccessResponse.instantiate())
        .await
        .unwrap_err();

    assert!(matches!(error, RelayError::Internal { message } if message == "boom"));
}

#[tokio::test]
async fn test_handler_return_value_propagates_unchanged() {
    let rendered = RenderedResponse {
        status_code: 201,
        body: serde_json::json!({"status": true}),
    };
    let expected = rendered.clone();
    let mut handler = MockCommandHandler::new();
    handler
        .expect_handle()
        .times(1)
        .returning(move |_, _| Ok(Outcome::Rendered(rendered.clone())));
    let bus = CommandBus::builder(RoutingTable::catalogue())
        .register("Response", Arc::new(handler))
        .build();

    let outcome = bus
        .dispatch(CommandKind::SuccessResponse.instantiate())
        .await
        .unwrap();

    assert_eq!(outcome.into_rendered(), Some(expected));
}

#[tokio::test]
async fn test_handlers_can_dispatch_follow_up_commands() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bus = CommandBus::builder(RoutingTable::catalogue())
        .register(
            "GitHub",
            Arc::new(RecordingHandler {
                seen: seen.clone(),
                follow_up: Some(CommandKind::Log(Severity::Warning)),
            }),
        )
        .register("Log", recorder(&seen))
        .build();

    bus.dispatch(CommandKind::GitHubWebHook.instantiate())
        .await
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            CommandKind::GitHubWebHook,
            CommandKind::Log(Severity::Warning)
        ]
    );
}

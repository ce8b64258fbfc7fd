//! # Command Handlers
//!
//! One handler per command namespace, registered with the
//! [`CommandBus`](crate::bus::CommandBus) under the namespace name:
//!
//! | Handler             | Commands                                   |
//! |---------------------|--------------------------------------------|
//! | [`GitHubHandler`]   | `GitHub/WebHook`                           |
//! | [`SlackHandler`]    | `Slack/Commands`, `Slack/Events`, `Slack/SendMessage` |
//! | [`TelegramHandler`] | `Telegram/Events`, `Telegram/SendMessage`  |
//! | [`LogHandler`]      | `Log/*`                                    |
//! | [`ResponseHandler`] | `Response/Success`, `Response/Error`       |
//!
//! Handlers never log directly on authentication failures; they dispatch a
//! `Log/*` command through the bus first and then reject the request.

use crate::bus::CommandBus;
use crate::command::{CommandFactory, CommandKind, Severity};
use crate::{RelayError, RelayResult, RoutingError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod github;
mod log;
mod response;
mod slack;
mod telegram;

pub use github::GitHubHandler;
pub use log::LogHandler;
pub use response::ResponseHandler;
pub use slack::SlackHandler;
pub use telegram::TelegramHandler;

/// A response command rendered into a status code and JSON body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedResponse {
    pub status_code: u16,
    pub body: Value,
}

/// Dispatch a `Log/<severity>` command through the bus
pub(crate) async fn dispatch_log(
    bus: &CommandBus,
    commands: &CommandFactory,
    severity: Severity,
    message: impl Into<String>,
    context: Map<String, Value>,
) -> RelayResult<()> {
    let message: String = message.into();
    let mut command = commands.create(&CommandKind::Log(severity).name())?;
    command
        .set_field("message", message)?
        .set_field("context", context)?;

    bus.dispatch(command).await?;
    Ok(())
}

pub(crate) fn misrouted(handler: &str, kind: CommandKind) -> RelayError {
    RoutingError::Misrouted {
        handler: handler.to_string(),
        command: kind.name(),
    }
    .into()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

//! Handler rendering `Log/*` commands as tracing events.

use super::misrouted;
use crate::bus::{CommandBus, CommandHandler, Outcome};
use crate::command::{Command, Severity};
use crate::RelayResult;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Writes log commands to the `application` tracing target
#[derive(Debug, Default)]
pub struct LogHandler;

impl LogHandler {
    /// Handler id used by the routing table
    pub const ID: &'static str = "Log";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for LogHandler {
    async fn handle(&self, command: Command, _bus: &CommandBus) -> RelayResult<Outcome> {
        let kind = command.kind();
        let Command::Log(entry) = command else {
            return Err(misrouted(Self::ID, kind));
        };

        let severity = entry.severity.as_str();
        let context = Value::Object(entry.context);
        let message = entry.message;

        match entry.severity {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                error!(target: "application", severity, %context, "{message}")
            }
            Severity::Warning => warn!(target: "application", severity, %context, "{message}"),
            Severity::Notice | Severity::Info => {
                info!(target: "application", severity, %context, "{message}")
            }
            Severity::Debug => debug!(target: "application", severity, %context, "{message}"),
        }

        Ok(Outcome::Completed)
    }
}

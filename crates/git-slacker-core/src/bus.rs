//! # Command Bus
//!
//! Routes each [`Command`] to the single handler bound to its kind and awaits
//! it in-line. The bus is the only entry point for side effects: handlers that
//! need further work (logging, events) dispatch through the bus they receive.
//!
//! Dispatch never buffers, queues, retries or reorders. A handler's return
//! value and error propagate to the caller unchanged.

use crate::command::{Command, CommandKind};
use crate::handlers::RenderedResponse;
use crate::routing::RoutingTable;
use crate::{RelayResult, RoutingError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Result of a successfully handled command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The command produced no output
    Completed,
    /// A response command was rendered
    Rendered(RenderedResponse),
}

impl Outcome {
    /// The rendered response, if the command produced one
    pub fn into_rendered(self) -> Option<RenderedResponse> {
        match self {
            Self::Rendered(response) => Some(response),
            Self::Completed => None,
        }
    }
}

/// Performs the side effects of one command namespace
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handle `command`, dispatching follow-up commands through `bus`
    async fn handle(&self, command: Command, bus: &CommandBus) -> RelayResult<Outcome>;
}

/// Builder for [`CommandBus`]
pub struct CommandBusBuilder {
    routes: RoutingTable,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandBusBuilder {
    /// Bind `handler` to the handler id `id` used by the routing table
    pub fn register(mut self, id: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        self.handlers.insert(id.into(), handler);
        self
    }

    pub fn build(self) -> CommandBus {
        CommandBus {
            routes: self.routes,
            handlers: self.handlers,
        }
    }
}

/// Routes commands to handlers; built once and shared read-only
pub struct CommandBus {
    routes: RoutingTable,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn builder(routes: RoutingTable) -> CommandBusBuilder {
        CommandBusBuilder {
            routes,
            handlers: HashMap::new(),
        }
    }

    /// Route `command` to its handler and await the result.
    ///
    /// # Errors
    ///
    /// [`RoutingError::NoHandler`] when the kind has no route or the route names
    /// an unregistered handler; otherwise whatever the handler returns.
    pub async fn dispatch(&self, command: Command) -> RelayResult<Outcome> {
        let kind = command.kind();
        let handler = self.resolve(kind)?;

        debug!(command = %kind, "Dispatching command");
        handler.handle(command, self).await
    }

    /// Whether `kind` has a registered handler
    pub fn has_handler(&self, kind: CommandKind) -> bool {
        self.resolve(kind).is_ok()
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    fn resolve(&self, kind: CommandKind) -> Result<&Arc<dyn CommandHandler>, RoutingError> {
        self.routes
            .handler_for(kind)
            .and_then(|id| self.handlers.get(id))
            .ok_or_else(|| RoutingError::NoHandler {
                command: kind.name(),
            })
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

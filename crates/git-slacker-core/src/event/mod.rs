//! # Domain Events
//!
//! Events describe something that already happened, such as a verified
//! webhook. They are built by the [`EventFactory`] only after verification
//! succeeds and are broadcast by the [`EventEmitter`] to every listener
//! registered for their kind.

use crate::naming::NameResolver;
use crate::{ConfigurationError, RelayResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod emitter;

pub use emitter::{
    EventEmitter, EventEmitterBuilder, LazyListener, Listener, ListenerProvider, ListenerRef,
};

/// Tag identifying the concrete type of a [`DomainEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    WebHookReceived,
}

impl EventKind {
    pub const ALL: [EventKind; 1] = [Self::WebHookReceived];

    /// Fully-qualified logical name, e.g. `WebHook/Received`
    pub fn name(&self) -> &'static str {
        match self {
            Self::WebHookReceived => "WebHook/Received",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A webhook that passed verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Received {
    provider_name: String,
    trigger: String,
    payload: Map<String, Value>,
}

impl Received {
    pub fn new(
        provider_name: impl Into<String>,
        trigger: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            trigger: trigger.into(),
            payload,
        }
    }

    /// Name of the service that sent the webhook, e.g. `GitHub`
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Event that caused the webhook, e.g. `push`
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

/// Immutable record of something that happened
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    WebHookReceived(Received),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::WebHookReceived(_) => EventKind::WebHookReceived,
        }
    }
}

/// Builds events from logical names, resolved like command names
pub struct EventFactory {
    resolver: NameResolver<EventKind>,
}

impl EventFactory {
    pub fn new() -> Self {
        Self {
            resolver: NameResolver::new(EventKind::from_name),
        }
    }

    /// Bind `alias` to `kind`, taking precedence over the naming convention
    pub fn register(mut self, alias: &str, kind: EventKind) -> Self {
        self.resolver.register(alias, kind);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<EventKind> {
        self.resolver.resolve(name)
    }

    /// Build the event called `name` from a webhook's provider, trigger and payload.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownEvent`] when the name resolves to nothing.
    pub fn create(
        &self,
        name: &str,
        provider_name: &str,
        trigger: &str,
        payload: Map<String, Value>,
    ) -> RelayResult<DomainEvent> {
        let kind = self
            .resolve(name)
            .ok_or_else(|| ConfigurationError::UnknownEvent {
                name: name.to_string(),
            })?;

        Ok(match kind {
            EventKind::WebHookReceived => {
                DomainEvent::WebHookReceived(Received::new(provider_name, trigger, payload))
            }
        })
    }
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

//! # git-slacker Core
//!
//! Command dispatch and verified webhook ingestion for the git-slacker relay.
//!
//! This crate contains the domain logic for authenticating inbound webhooks from
//! source-control and chat platforms, turning them into commands, routing each
//! command to its single handler, and broadcasting the resulting domain events
//! to registered listeners.
//!
//! ## Architecture
//!
//! - [`command`]: typed commands, name-based field assignment and the command factory
//! - [`bus`]: the command bus that routes a command to exactly one handler
//! - [`routing`]: the command -> handler routing table and its on-disk cache
//! - [`event`]: domain events, the event factory and the listener emitter
//! - [`verification`]: HMAC signature and shared-token checks
//! - [`handlers`] / [`listeners`]: the concrete handlers and listeners
//!
//! Registries are built once at startup and shared read-only afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use git_slacker_core::command::{CommandFactory, FieldValue};
//!
//! let factory = CommandFactory::new();
//! let mut command = factory.create("Response/Success").unwrap();
//! command
//!     .set_field("body", FieldValue::from(serde_json::json!({"message": "ok"})))
//!     .unwrap();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use uuid::Uuid;

/// Standard result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

// ============================================================================
// Identifier Types
// ============================================================================

/// Identifier for tracing a request across the relay and into error responses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate new correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get string representation
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Uuid>()?))
    }
}

/// Unique identifier of a persisted webhook record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a new unique event ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UTC timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current moment
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Convert to RFC3339 string
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// High-level error categorization used by the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Wiring or programming defect; never expected at runtime
    Configuration,
    /// Webhook authenticity could not be established
    Security,
    /// No route exists for the command or provider
    Routing,
    /// Failure of an external collaborator or an unexpected condition
    Unexpected,
}

/// Errors caused by a wiring or programming defect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unknown command '{name}'")]
    UnknownCommand { name: String },

    #[error("Unknown event '{name}'")]
    UnknownEvent { name: String },

    #[error("Invalid property name '{field}' for command '{command}'")]
    UnknownField { command: String, field: String },

    #[error("Property '{field}' of command '{command}' expects {expected}")]
    InvalidFieldType {
        command: String,
        field: String,
        expected: &'static str,
    },

    #[error("Required property '{field}' of command '{command}' is not set")]
    MissingField { command: String, field: String },

    #[error("Secret '{name}' cannot be used as an HMAC key")]
    InvalidSecret { name: String },
}

/// Reasons an inbound webhook is rejected as unauthenticated
///
/// The display strings are returned verbatim to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid request format")]
    InvalidRequestFormat,

    #[error("Invalid request signature")]
    InvalidRequestSignature,

    #[error("Empty secure token")]
    EmptySecureToken,

    #[error("Invalid secure token")]
    InvalidSecureToken,
}

/// Errors raised when a command or request has nowhere to go
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("No handler registered for command '{command}'")]
    NoHandler { command: String },

    #[error("Handler '{handler}' cannot handle command '{command}'")]
    Misrouted { handler: String, command: String },

    #[error("Unknown service provider")]
    UnknownProvider { provider: String },

    #[error("Whoopsies! Route not found!")]
    RouteNotFound { path: String },
}

/// Errors raised while persisting received events
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while delivering an outbound chat message
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("No credentials configured for {platform}")]
    NotConfigured { platform: String },

    #[error("{platform} rejected the message: {message}")]
    Rejected { platform: String, message: String },

    #[error("{platform} could not be reached: {message}")]
    Transport { platform: String, message: String },
}

/// Top-level error type for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RelayError {
    /// Get error category for rendering and alerting
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Authentication(_) => ErrorCategory::Security,
            Self::Routing(_) => ErrorCategory::Routing,
            Self::Storage(_) => ErrorCategory::Unexpected,
            Self::Delivery(_) => ErrorCategory::Unexpected,
            Self::Internal { .. } => ErrorCategory::Unexpected,
        }
    }

    /// Render the error and every underlying cause as a list of messages
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            messages.push(cause.to_string());
            source = cause.source();
        }
        messages
    }
}

// ============================================================================
// Module declarations
// ============================================================================

/// Commands, field assignment and the command factory
pub mod command;

/// Command bus routing each command to its handler
pub mod bus;

/// Command -> handler routing table
pub mod routing;

/// Domain events, event factory and emitter
pub mod event;

/// Webhook signature and token verification
pub mod verification;

/// Secret values loaded at startup
pub mod secrets;

/// Outbound chat message delivery contract
pub mod messaging;

/// Command handlers
pub mod handlers;

/// Event listeners
pub mod listeners;

mod naming;

// Re-export key types for convenience
pub use bus::{CommandBus, CommandBusBuilder, CommandHandler, Outcome};
pub use command::{Command, CommandFactory, CommandKind, FieldValue, Severity};
pub use event::{
    DomainEvent, EventEmitter, EventEmitterBuilder, EventFactory, EventKind, LazyListener,
    Listener, ListenerProvider, ListenerRef, Received,
};
pub use handlers::RenderedResponse;
pub use messaging::{ChatPlatform, ChatTransport};
pub use routing::RoutingTable;
pub use secrets::{SecretValue, Secrets};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

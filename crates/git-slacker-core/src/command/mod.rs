//! # Commands
//!
//! A command is a unit of work routed to exactly one handler by the
//! [`CommandBus`](crate::bus::CommandBus). Each kind is a plain struct with
//! typed fields; [`Command`] is the tagged union the bus routes on.
//!
//! Fields may also be assigned by name through [`Command::set_field`], which
//! is how the HTTP layer populates commands created by the [`CommandFactory`].
//! Assigning a field the command does not declare is a wiring defect and
//! fails with [`ConfigurationError::UnknownField`], leaving the command as it was.

use crate::ConfigurationError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod chat;
pub mod factory;
pub mod github;
pub mod log;
pub mod response;

pub use chat::{SlackCommands, SlackEvents, SlackSendMessage, TelegramEvents, TelegramSendMessage};
pub use factory::CommandFactory;
pub use github::GitHubWebHook;
pub use log::LogEntry;
pub use response::{ErrorResponse, SuccessResponse};

// ============================================================================
// Field values
// ============================================================================

/// A value assigned to a command field by name
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bytes(Bytes),
    Json(Value),
    Integer(i64),
}

impl FieldValue {
    /// Interpret the value as text
    pub(crate) fn into_text(
        self,
        command: CommandKind,
        field: &str,
    ) -> Result<String, ConfigurationError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(Value::String(text)) => Ok(text),
            _ => Err(invalid_type(command, field, "a string")),
        }
    }

    /// Interpret the value as raw bytes; text is taken as its UTF-8 encoding
    pub(crate) fn into_bytes(
        self,
        command: CommandKind,
        field: &str,
    ) -> Result<Bytes, ConfigurationError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Text(text) => Ok(Bytes::from(text)),
            _ => Err(invalid_type(command, field, "raw bytes")),
        }
    }

    /// Interpret the value as a JSON object
    pub(crate) fn into_map(
        self,
        command: CommandKind,
        field: &str,
    ) -> Result<Map<String, Value>, ConfigurationError> {
        match self {
            Self::Json(Value::Object(map)) => Ok(map),
            _ => Err(invalid_type(command, field, "a map")),
        }
    }

    /// Interpret the value as any JSON value
    pub(crate) fn into_json(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text),
            Self::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            Self::Json(value) => value,
            Self::Integer(number) => Value::from(number),
        }
    }

    /// Interpret the value as an HTTP-style status code
    pub(crate) fn into_status_code(
        self,
        command: CommandKind,
        field: &str,
    ) -> Result<u16, ConfigurationError> {
        let number = match self {
            Self::Integer(number) => Some(number),
            Self::Json(Value::Number(number)) => number.as_i64(),
            _ => None,
        };

        number
            .filter(|n| (100..=599).contains(n))
            .map(|n| n as u16)
            .ok_or_else(|| invalid_type(command, field, "a status code between 100 and 599"))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Bytes> for FieldValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Map<String, Value>> for FieldValue {
    fn from(value: Map<String, Value>) -> Self {
        Self::Json(Value::Object(value))
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

pub(crate) fn unknown_field(command: CommandKind, field: &str) -> ConfigurationError {
    ConfigurationError::UnknownField {
        command: command.name(),
        field: field.to_string(),
    }
}

pub(crate) fn missing_field(command: CommandKind, field: &str) -> ConfigurationError {
    ConfigurationError::MissingField {
        command: command.name(),
        field: field.to_string(),
    }
}

fn invalid_type(command: CommandKind, field: &str, expected: &'static str) -> ConfigurationError {
    ConfigurationError::InvalidFieldType {
        command: command.name(),
        field: field.to_string(),
        expected,
    }
}

// ============================================================================
// Command kinds
// ============================================================================

/// Log severity, mirroring the classic syslog levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "Emergency",
            Self::Alert => "Alert",
            Self::Critical => "Critical",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Notice => "Notice",
            Self::Info => "Info",
            Self::Debug => "Debug",
        }
    }
}

/// Tag identifying the concrete type of a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandKind {
    GitHubWebHook,
    SlackCommands,
    SlackEvents,
    SlackSendMessage,
    TelegramEvents,
    TelegramSendMessage,
    Log(Severity),
    SuccessResponse,
    ErrorResponse,
}

impl CommandKind {
    /// Every command kind known to the relay
    pub const ALL: [CommandKind; 16] = [
        Self::GitHubWebHook,
        Self::SlackCommands,
        Self::SlackEvents,
        Self::SlackSendMessage,
        Self::TelegramEvents,
        Self::TelegramSendMessage,
        Self::Log(Severity::Emergency),
        Self::Log(Severity::Alert),
        Self::Log(Severity::Critical),
        Self::Log(Severity::Error),
        Self::Log(Severity::Warning),
        Self::Log(Severity::Notice),
        Self::Log(Severity::Info),
        Self::Log(Severity::Debug),
        Self::SuccessResponse,
        Self::ErrorResponse,
    ];

    /// Namespace the command lives under; commands sharing a namespace share a handler
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::GitHubWebHook => "GitHub",
            Self::SlackCommands | Self::SlackEvents | Self::SlackSendMessage => "Slack",
            Self::TelegramEvents | Self::TelegramSendMessage => "Telegram",
            Self::Log(_) => "Log",
            Self::SuccessResponse | Self::ErrorResponse => "Response",
        }
    }

    /// Short name within the namespace
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::GitHubWebHook => "WebHook",
            Self::SlackCommands => "Commands",
            Self::SlackEvents | Self::TelegramEvents => "Events",
            Self::SlackSendMessage | Self::TelegramSendMessage => "SendMessage",
            Self::Log(severity) => severity.as_str(),
            Self::SuccessResponse => "Success",
            Self::ErrorResponse => "Error",
        }
    }

    /// Fully-qualified logical name, e.g. `GitHub/WebHook`
    pub fn name(&self) -> String {
        format!("{}/{}", self.namespace(), self.short_name())
    }

    /// Find the kind whose fully-qualified name is exactly `name`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Instantiate an empty command of this kind
    pub fn instantiate(self) -> Command {
        match self {
            Self::GitHubWebHook => Command::GitHubWebHook(GitHubWebHook::default()),
            Self::SlackCommands => Command::SlackCommands(SlackCommands::default()),
            Self::SlackEvents => Command::SlackEvents(SlackEvents::default()),
            Self::SlackSendMessage => Command::SlackSendMessage(SlackSendMessage::default()),
            Self::TelegramEvents => Command::TelegramEvents(TelegramEvents::default()),
            Self::TelegramSendMessage => {
                Command::TelegramSendMessage(TelegramSendMessage::default())
            }
            Self::Log(severity) => Command::Log(LogEntry::new(severity)),
            Self::SuccessResponse => Command::SuccessResponse(SuccessResponse::default()),
            Self::ErrorResponse => Command::ErrorResponse(ErrorResponse::default()),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace(), self.short_name())
    }
}

// ============================================================================
// Command
// ============================================================================

/// Name-based field assignment implemented by every command struct
pub trait CommandFields {
    /// Assign `value` to the field called `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownField`] when `name` is not declared and
    /// [`ConfigurationError::InvalidFieldType`] when `value` has the wrong
    /// shape. The command is unchanged in both cases.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError>;
}

/// A unit of work routed to exactly one handler
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GitHubWebHook(GitHubWebHook),
    SlackCommands(SlackCommands),
    SlackEvents(SlackEvents),
    SlackSendMessage(SlackSendMessage),
    TelegramEvents(TelegramEvents),
    TelegramSendMessage(TelegramSendMessage),
    Log(LogEntry),
    SuccessResponse(SuccessResponse),
    ErrorResponse(ErrorResponse),
}

impl Command {
    /// Tag of the concrete command type
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::GitHubWebHook(_) => CommandKind::GitHubWebHook,
            Self::SlackCommands(_) => CommandKind::SlackCommands,
            Self::SlackEvents(_) => CommandKind::SlackEvents,
            Self::SlackSendMessage(_) => CommandKind::SlackSendMessage,
            Self::TelegramEvents(_) => CommandKind::TelegramEvents,
            Self::TelegramSendMessage(_) => CommandKind::TelegramSendMessage,
            Self::Log(entry) => CommandKind::Log(entry.severity),
            Self::SuccessResponse(_) => CommandKind::SuccessResponse,
            Self::ErrorResponse(_) => CommandKind::ErrorResponse,
        }
    }

    /// Assign a single field by name; chainable.
    ///
    /// # Errors
    ///
    /// See [`CommandFields::set_field`].
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<&mut Self, ConfigurationError> {
        let value = value.into();
        match self {
            Self::GitHubWebHook(command) => command.set_field(name, value)?,
            Self::SlackCommands(command) => command.set_field(name, value)?,
            Self::SlackEvents(command) => command.set_field(name, value)?,
            Self::SlackSendMessage(command) => command.set_field(name, value)?,
            Self::TelegramEvents(command) => command.set_field(name, value)?,
            Self::TelegramSendMessage(command) => command.set_field(name, value)?,
            Self::Log(command) => command.set_field(name, value)?,
            Self::SuccessResponse(command) => command.set_field(name, value)?,
            Self::ErrorResponse(command) => command.set_field(name, value)?,
        }
        Ok(self)
    }

    /// Assign every entry of `fields` in iteration order.
    ///
    /// Stops at the first offending entry; entries before it stay applied.
    pub fn set_fields<I, K, V>(&mut self, fields: I) -> Result<&mut Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        for (name, value) in fields {
            self.set_field(name.as_ref(), value)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

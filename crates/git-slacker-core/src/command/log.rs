//! Log commands, one kind per severity.

use super::{unknown_field, CommandFields, CommandKind, FieldValue, Severity};
use crate::ConfigurationError;
use serde_json::{Map, Value};

/// A structured log line to be written by the log handler
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
    pub context: Map<String, Value>,
}

impl LogEntry {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            message: String::new(),
            context: Map::new(),
        }
    }
}

impl CommandFields for LogEntry {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        let kind = CommandKind::Log(self.severity);
        match name {
            "message" => self.message = value.into_text(kind, name)?,
            "context" => self.context = value.into_map(kind, name)?,
            _ => return Err(unknown_field(kind, name)),
        }
        Ok(())
    }
}

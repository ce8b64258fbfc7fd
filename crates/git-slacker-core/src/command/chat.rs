//! Commands for the Slack and Telegram bot endpoints.

use super::{unknown_field, CommandFields, CommandKind, FieldValue};
use crate::ConfigurationError;
use serde_json::{Map, Value};

/// A Slack slash-command invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlackCommands {
    pub payload: Map<String, Value>,
}

impl CommandFields for SlackCommands {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        const KIND: CommandKind = CommandKind::SlackCommands;
        match name {
            "payload" => self.payload = value.into_map(KIND, name)?,
            _ => return Err(unknown_field(KIND, name)),
        }
        Ok(())
    }
}

/// A Slack Events API callback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlackEvents {
    pub payload: Map<String, Value>,
}

impl CommandFields for SlackEvents {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        const KIND: CommandKind = CommandKind::SlackEvents;
        match name {
            "payload" => self.payload = value.into_map(KIND, name)?,
            _ => return Err(unknown_field(KIND, name)),
        }
        Ok(())
    }
}

/// A Telegram bot update; the shared token travels in the URL path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelegramEvents {
    pub secure_token: Option<String>,
    pub payload: Map<String, Value>,
}

impl CommandFields for TelegramEvents {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        const KIND: CommandKind = CommandKind::TelegramEvents;
        match name {
            "secure_token" => self.secure_token = Some(value.into_text(KIND, name)?),
            "payload" => self.payload = value.into_map(KIND, name)?,
            _ => return Err(unknown_field(KIND, name)),
        }
        Ok(())
    }
}

/// Outbound message to a Slack channel or user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlackSendMessage {
    pub message: Option<String>,
    pub recipient: Option<String>,
}

impl CommandFields for SlackSendMessage {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        set_message_field(
            CommandKind::SlackSendMessage,
            &mut self.message,
            &mut self.recipient,
            name,
            value,
        )
    }
}

/// Outbound message to a Telegram chat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelegramSendMessage {
    pub message: Option<String>,
    pub recipient: Option<String>,
}

impl CommandFields for TelegramSendMessage {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        set_message_field(
            CommandKind::TelegramSendMessage,
            &mut self.message,
            &mut self.recipient,
            name,
            value,
        )
    }
}

fn set_message_field(
    kind: CommandKind,
    message: &mut Option<String>,
    recipient: &mut Option<String>,
    name: &str,
    value: FieldValue,
) -> Result<(), ConfigurationError> {
    match name {
        "message" => *message = Some(value.into_text(kind, name)?),
        // Telegram chat ids arrive as numbers
        "recipient" => {
            *recipient = Some(match value {
                FieldValue::Integer(id) => id.to_string(),
                FieldValue::Json(Value::Number(id)) => id.to_string(),
                other => other.into_text(kind, name)?,
            })
        }
        _ => return Err(unknown_field(kind, name)),
    }
    Ok(())
}

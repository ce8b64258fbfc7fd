//! Commands originating from the GitHub webhook endpoint.

use super::{unknown_field, CommandFields, CommandKind, FieldValue};
use crate::ConfigurationError;
use bytes::Bytes;
use serde_json::{Map, Value};

/// An inbound GitHub webhook awaiting signature verification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GitHubWebHook {
    /// Value of the `X-GitHub-Event` header
    pub event_name: Option<String>,
    /// Value of the `X-Hub-Signature` header
    pub request_signature: Option<String>,
    /// Parsed JSON body
    pub payload: Map<String, Value>,
    /// Raw request body the signature was computed over
    pub raw: Bytes,
}

impl CommandFields for GitHubWebHook {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        const KIND: CommandKind = CommandKind::GitHubWebHook;
        match name {
            "event_name" => self.event_name = Some(value.into_text(KIND, name)?),
            "request_signature" => self.request_signature = Some(value.into_text(KIND, name)?),
            "payload" => self.payload = value.into_map(KIND, name)?,
            "raw" => self.raw = value.into_bytes(KIND, name)?,
            _ => return Err(unknown_field(KIND, name)),
        }
        Ok(())
    }
}

//! Response commands rendered into the HTTP reply.

use super::{unknown_field, CommandFields, CommandKind, FieldValue};
use crate::ConfigurationError;
use serde_json::{Map, Value};

const DEFAULT_STATUS_CODE: u16 = 200;

/// A successful reply; the rendered body always carries `status: true`
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessResponse {
    pub body: Map<String, Value>,
    pub status_code: u16,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self {
            body: Map::new(),
            status_code: DEFAULT_STATUS_CODE,
        }
    }
}

impl CommandFields for SuccessResponse {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        const KIND: CommandKind = CommandKind::SuccessResponse;
        match name {
            "body" => {
                let mut body = value.into_map(KIND, name)?;
                body.insert("status".to_string(), Value::Bool(true));
                self.body = body;
            }
            "status_code" => self.status_code = value.into_status_code(KIND, name)?,
            _ => return Err(unknown_field(KIND, name)),
        }
        Ok(())
    }
}

/// A failed reply; setting `error` derives `body = {status: false, error}`
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub body: Map<String, Value>,
    pub error: Option<Value>,
    pub status_code: u16,
}

impl Default for ErrorResponse {
    fn default() -> Self {
        Self {
            body: Map::new(),
            error: None,
            status_code: DEFAULT_STATUS_CODE,
        }
    }
}

impl CommandFields for ErrorResponse {
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ConfigurationError> {
        const KIND: CommandKind = CommandKind::ErrorResponse;
        match name {
            "error" => {
                let error = value.into_json();
                let mut body = Map::new();
                body.insert("status".to_string(), Value::Bool(false));
                body.insert("error".to_string(), error.clone());
                self.body = body;
                self.error = Some(error);
            }
            "body" => self.body = value.into_map(KIND, name)?,
            "status_code" => self.status_code = value.into_status_code(KIND, name)?,
            _ => return Err(unknown_field(KIND, name)),
        }
        Ok(())
    }
}

//! Handler rendering response commands.

use super::{misrouted, RenderedResponse};
use crate::bus::{CommandBus, CommandHandler, Outcome};
use crate::command::Command;
use crate::RelayResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Turns `Response/Success` and `Response/Error` into a [`RenderedResponse`]
#[derive(Debug, Default)]
pub struct ResponseHandler;

impl ResponseHandler {
    /// Handler id used by the routing table
    pub const ID: &'static str = "Response";

    pub fn new() -> Self {
        Self
    }
}

fn render(mut body: Map<String, Value>, default_status: bool, status_code: u16) -> Outcome {
    body.entry("status").or_insert(Value::Bool(default_status));

    Outcome::Rendered(RenderedResponse {
        status_code,
        body: Value::Object(body),
    })
}

#[async_trait]
impl CommandHandler for ResponseHandler {
    async fn handle(&self, command: Command, _bus: &CommandBus) -> RelayResult<Outcome> {
        match command {
            Command::SuccessResponse(success) => {
                Ok(render(success.body, true, success.status_code))
            }
            Command::ErrorResponse(failure) => {
                Ok(render(failure.body, false, failure.status_code))
            }
            other => Err(misrouted(Self::ID, other.kind())),
        }
    }
}

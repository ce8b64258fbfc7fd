//! Listeners for `WebHook/Received`.

use super::store::{EventStore, WebHookRecord};
use crate::event::{DomainEvent, Listener};
use crate::RelayResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Logs every received webhook at debug level
#[derive(Debug, Default)]
pub struct WebHookLogListener;

impl WebHookLogListener {
    pub const ID: &'static str = "WebHook/Log";
}

#[async_trait]
impl Listener for WebHookLogListener {
    async fn handle(&self, event: &DomainEvent) -> RelayResult<()> {
        let DomainEvent::WebHookReceived(received) = event;
        let payload = Value::Object(received.payload().clone());
        debug!(
            target: "webhook",
            provider = received.provider_name(),
            trigger = received.trigger(),
            payload = %payload,
            "WebHook received"
        );
        Ok(())
    }
}

/// Appends every received webhook to an [`EventStore`]
pub struct PersistReceivedWebHook {
    store: Arc<dyn EventStore>,
}

impl PersistReceivedWebHook {
    pub const ID: &'static str = "WebHook/Persist";

    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Listener for PersistReceivedWebHook {
    async fn handle(&self, event: &DomainEvent) -> RelayResult<()> {
        let DomainEvent::WebHookReceived(received) = event;
        let record = WebHookRecord::from_received(received);

        self.store.insert(&record).await?;
        debug!(id = %record.id, "Stored received webhook");
        Ok(())
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

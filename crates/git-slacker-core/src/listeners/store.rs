//! # Event Store
//!
//! Persistence of verified webhooks. The relay only ever appends; reading back
//! exists for operators and tests.

use crate::event::Received;
use crate::{EventId, StorageError, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One persisted webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebHookRecord {
    pub id: EventId,
    pub provider: String,
    pub trigger: String,
    pub payload: Map<String, Value>,
    pub received_at: Timestamp,
}

impl WebHookRecord {
    /// Build a new record for `received`, stamped with the current time
    pub fn from_received(received: &Received) -> Self {
        Self {
            id: EventId::new(),
            provider: received.provider_name().to_string(),
            trigger: received.trigger().to_string(),
            payload: received.payload().clone(),
            received_at: Timestamp::now(),
        }
    }
}

/// Insert-only storage for received webhooks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, record: &WebHookRecord) -> Result<(), StorageError>;
}

/// Appends records as JSON lines to `<directory>/webhooks.jsonl`
#[derive(Debug)]
pub struct FilesystemEventStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilesystemEventStore {
    pub const FILE_NAME: &'static str = "webhooks.jsonl";

    /// Create the store, creating `directory` if needed.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] when the directory cannot be created.
    pub async fn new(directory: impl AsRef<Path>) -> Result<Self, StorageError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory).await?;

        Ok(Self {
            path: directory.join(Self::FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record in insertion order
    pub async fn read_all(&self) -> Result<Vec<WebHookRecord>, StorageError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StorageError::from))
            .collect()
    }
}

#[async_trait]
impl EventStore for FilesystemEventStore {
    async fn insert(&self, record: &WebHookRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

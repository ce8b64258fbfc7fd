//! # Routing Table
//!
//! Maps every command name to the id of the handler that serves it. Commands
//! are grouped by namespace: `GitHub/*` goes to handler `GitHub`, `Log/*` to
//! `Log`, and so on.
//!
//! The table can be cached as JSON. The cache carries a fingerprint of the
//! command catalogue and is rebuilt whenever the fingerprint no longer matches.

use crate::command::CommandKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Command name -> handler id, tagged with the catalogue fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    fingerprint: String,
    routes: BTreeMap<String, String>,
}

impl RoutingTable {
    /// Build the table for `kinds` by grouping each under its namespace
    pub fn derive(kinds: &[CommandKind]) -> Self {
        let routes: BTreeMap<String, String> = kinds
            .iter()
            .map(|kind| (kind.name(), kind.namespace().to_string()))
            .collect();

        Self {
            fingerprint: fingerprint(&routes),
            routes,
        }
    }

    /// Build the table for the full command catalogue
    pub fn catalogue() -> Self {
        Self::derive(&CommandKind::ALL)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn routes(&self) -> &BTreeMap<String, String> {
        &self.routes
    }

    /// Handler id bound to `kind`, if any
    pub fn handler_for(&self, kind: CommandKind) -> Option<&str> {
        self.routes.get(&kind.name()).map(String::as_str)
    }

    /// Whether the table was derived from the current command catalogue
    pub fn is_current(&self) -> bool {
        self.fingerprint == Self::catalogue().fingerprint
            && self.fingerprint == fingerprint(&self.routes)
    }

    /// Load the cached table from `cache_path`, rebuilding it when absent or stale.
    ///
    /// A rebuilt table is written back to the cache. Cache failures are logged
    /// and never prevent startup.
    pub async fn load_or_derive(cache_path: Option<&Path>) -> Self {
        let Some(path) = cache_path else {
            return Self::catalogue();
        };

        match tokio::fs::read(path).await {
            Ok(contents) => match serde_json::from_slice::<RoutingTable>(&contents) {
                Ok(table) if table.is_current() => {
                    debug!(path = %path.display(), "Loaded routing table from cache");
                    return table;
                }
                Ok(_) => {
                    warn!(path = %path.display(), "Routing table cache is stale; rebuilding");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Routing table cache is corrupt; rebuilding");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No routing table cache; building");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read routing table cache; rebuilding");
            }
        }

        let table = Self::catalogue();
        if let Err(e) = table.store(path).await {
            warn!(path = %path.display(), error = %e, "Cannot write routing table cache");
        }
        table
    }

    async fn store(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, contents).await
    }
}

fn fingerprint(routes: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for (command, handler) in routes {
        hasher.update(command.as_bytes());
        hasher.update(b"=");
        hasher.update(handler.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;

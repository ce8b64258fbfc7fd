//! # Event Listeners
//!
//! Listeners for [`EventKind::WebHookReceived`] and the provider binding them
//! to the emitter. Bindings are lazy: a listener (and its store) is built the
//! first time an event reaches it.

use crate::event::{EventKind, LazyListener, Listener, ListenerProvider, ListenerRef};
use crate::RelayError;
use std::path::PathBuf;
use std::sync::Arc;

mod store;
mod webhook;

pub use store::{EventStore, FilesystemEventStore, WebHookRecord};
pub use webhook::{PersistReceivedWebHook, WebHookLogListener};

#[cfg(test)]
pub use store::MockEventStore;

/// Where the persistence listener stores records
#[derive(Clone)]
enum StoreSource {
    None,
    Directory(PathBuf),
    Store(Arc<dyn EventStore>),
}

/// Binds the persistence listener (when storage is configured) and the log
/// listener to `WebHook/Received`, in that order.
#[derive(Clone)]
pub struct WebHookListenerProvider {
    store: StoreSource,
}

impl WebHookListenerProvider {
    pub fn new() -> Self {
        Self {
            store: StoreSource::None,
        }
    }

    /// Persist records as JSON lines under `directory`
    pub fn with_event_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.store = StoreSource::Directory(directory.into());
        self
    }

    /// Persist records into `store`
    pub fn with_event_store(mut self, store: Arc<dyn EventStore>) -> Self {
        self.store = StoreSource::Store(store);
        self
    }

    fn persistence_listener(&self) -> Option<ListenerRef> {
        match self.store.clone() {
            StoreSource::None => None,
            StoreSource::Directory(directory) => Some(LazyListener::new(
                PersistReceivedWebHook::ID,
                move || {
                    let directory = directory.clone();
                    async move {
                        let store = FilesystemEventStore::new(directory).await?;
                        Ok::<_, RelayError>(
                            Arc::new(PersistReceivedWebHook::new(Arc::new(store)))
                                as Arc<dyn Listener>,
                        )
                    }
                },
            )),
            StoreSource::Store(store) => {
                Some(LazyListener::new(PersistReceivedWebHook::ID, move || {
                    let store = store.clone();
                    async move {
                        Ok::<_, RelayError>(
                            Arc::new(PersistReceivedWebHook::new(store)) as Arc<dyn Listener>
                        )
                    }
                }))
            }
        }
    }
}

impl Default for WebHookListenerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerProvider for WebHookListenerProvider {
    fn provide_listeners(&self) -> Vec<(EventKind, Vec<ListenerRef>)> {
        let mut listeners: Vec<ListenerRef> = self.persistence_listener().into_iter().collect();
        listeners.push(LazyListener::new(WebHookLogListener::ID, || async {
            Ok::<_, RelayError>(Arc::new(WebHookLogListener) as Arc<dyn Listener>)
        }));

        vec![(EventKind::WebHookReceived, listeners)]
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

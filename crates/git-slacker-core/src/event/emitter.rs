//! Listener registry and in-line event delivery.

use super::{DomainEvent, EventKind};
use crate::RelayResult;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Reacts to emitted domain events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Listener: Send + Sync {
    /// Handle `event`; errors abort delivery to the remaining listeners
    async fn handle(&self, event: &DomainEvent) -> RelayResult<()>;
}

type ListenerFuture = Pin<Box<dyn Future<Output = RelayResult<Arc<dyn Listener>>> + Send>>;
type ListenerInit = Box<dyn Fn() -> ListenerFuture + Send + Sync>;

/// A listener constructed on its first invocation
pub struct LazyListener {
    id: String,
    init: ListenerInit,
    cell: OnceCell<Arc<dyn Listener>>,
}

/// Shared handle to a lazily constructed listener
pub type ListenerRef = Arc<LazyListener>;

impl LazyListener {
    /// Defer construction of the listener `id` to `init`
    pub fn new<F, Fut>(id: impl Into<String>, init: F) -> ListenerRef
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RelayResult<Arc<dyn Listener>>> + Send + 'static,
    {
        Arc::new(Self {
            id: id.into(),
            init: Box::new(move || Box::pin(init())),
            cell: OnceCell::new(),
        })
    }

    /// Wrap an already constructed listener
    pub fn ready(id: impl Into<String>, listener: Arc<dyn Listener>) -> ListenerRef {
        Arc::new(Self {
            id: id.into(),
            init: Box::new(|| {
                Box::pin(async {
                    Err::<Arc<dyn Listener>, _>(crate::RelayError::Internal {
                        message: "listener initializer invoked for a ready listener".to_string(),
                    })
                })
            }),
            cell: OnceCell::new_with(Some(listener)),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the listener has been constructed
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }

    /// Construct the listener if needed and return it.
    ///
    /// A failed construction is not cached; the next call retries it.
    pub async fn resolve(&self) -> RelayResult<&Arc<dyn Listener>> {
        self.cell.get_or_try_init(|| (self.init)()).await
    }
}

impl std::fmt::Debug for LazyListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyListener")
            .field("id", &self.id)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Supplies listener bindings to an [`EventEmitterBuilder`] at startup
pub trait ListenerProvider {
    fn provide_listeners(&self) -> Vec<(EventKind, Vec<ListenerRef>)>;
}

/// Builder for [`EventEmitter`]
#[derive(Default)]
pub struct EventEmitterBuilder {
    listeners: HashMap<EventKind, Vec<ListenerRef>>,
}

impl EventEmitterBuilder {
    /// Append `listener` to the listeners of `kind`
    pub fn add_listener(mut self, kind: EventKind, listener: ListenerRef) -> Self {
        self.listeners.entry(kind).or_default().push(listener);
        self
    }

    /// Append every binding supplied by `provider`, preserving its order
    pub fn use_listener_provider(mut self, provider: &dyn ListenerProvider) -> Self {
        for (kind, listeners) in provider.provide_listeners() {
            self.listeners.entry(kind).or_default().extend(listeners);
        }
        self
    }

    pub fn build(self) -> EventEmitter {
        EventEmitter {
            listeners: self.listeners,
        }
    }
}

/// Delivers events to their listeners in registration order
#[derive(Debug)]
pub struct EventEmitter {
    listeners: HashMap<EventKind, Vec<ListenerRef>>,
}

impl EventEmitter {
    pub fn builder() -> EventEmitterBuilder {
        EventEmitterBuilder::default()
    }

    /// Invoke every listener of the event's kind, each awaited before the next.
    ///
    /// # Errors
    ///
    /// The first listener error, unchanged. Later listeners are not invoked.
    #[instrument(skip(self, event), fields(event = %event.kind()))]
    pub async fn emit(&self, event: &DomainEvent) -> RelayResult<()> {
        let Some(listeners) = self.listeners.get(&event.kind()) else {
            debug!("No listeners registered");
            return Ok(());
        };

        for listener in listeners {
            debug!(listener = listener.id(), "Delivering event");
            listener.resolve().await?.handle(event).await?;
        }

        Ok(())
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Event name -> listener ids, in invocation order
    pub fn manifest(&self) -> BTreeMap<String, Vec<String>> {
        self.listeners
            .iter()
            .map(|(kind, listeners)| {
                (
                    kind.name().to_string(),
                    listeners.iter().map(|l| l.id().to_string()).collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "emitter_tests.rs"]
mod tests;

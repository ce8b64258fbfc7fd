//! Tests for listener registration and event delivery.

use super::*;
use crate::event::Received;
use crate::RelayError;
use serde_json::Map;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Appends its name to a shared journal, optionally failing afterwards
struct JournalListener {
    name: &'static str,
    journal: Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
}

#[async_trait]
impl Listener for JournalListener {
    async fn handle(&self, _event: &DomainEvent) -> RelayResult<()> {
        self.journal.lock().unwrap().push(self.name);
        if self.fail {
            return Err(RelayError::Internal {
                message: format!("{} failed", self.name),
            });
        }
        Ok(())
    }
}

fn journal_listener(
    name: &'static str,
    journal: &Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
) -> ListenerRef {
    LazyListener::ready(
        name,
        Arc::new(JournalListener {
            name,
            journal: journal.clone(),
            fail,
        }),
    )
}

fn received() -> DomainEvent {
    DomainEvent::WebHookReceived(Received::new("GitHub", "push", Map::new()))
}

#[tokio::test]
async fn test_listeners_run_in_registration_order() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let emitter = EventEmitter::builder()
        .add_listener(EventKind::WebHookReceived, journal_listener("persist", &journal, false))
        .add_listener(EventKind::WebHookReceived, journal_listener("log", &journal, false))
        .build();

    emitter.emit(&received()).await.unwrap();

    assert_eq!(*journal.lock().unwrap(), vec!["persist", "log"]);
}

#[tokio::test]
async fn test_failing_listener_aborts_delivery() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let emitter = EventEmitter::builder()
        .add_listener(EventKind::WebHookReceived, journal_listener("first", &journal, false))
        .add_listener(EventKind::WebHookReceived, journal_listener("second", &journal, true))
        .add_listener(EventKind::WebHookReceived, journal_listener("third", &journal, false))
        .build();

    let error = emitter.emit(&received()).await.unwrap_err();

    assert!(matches!(error, RelayError::Internal { message } if message == "second failed"));
    assert_eq!(*journal.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn test_emit_without_listeners_succeeds() {
    let emitter = EventEmitter::builder().build();

    emitter.emit(&received()).await.unwrap();

    assert_eq!(emitter.listener_count(EventKind::WebHookReceived), 0);
}

#[tokio::test]
async fn test_listener_receives_the_emitted_event() {
    let mut listener = MockListener::new();
    listener
        .expect_handle()
        .withf(|event| match event {
            DomainEvent::WebHookReceived(received) => received.trigger() == "push",
        })
        .times(1)
        .returning(|_| Ok(()));
    let emitter = EventEmitter::builder()
        .add_listener(
            EventKind::WebHookReceived,
            LazyListener::ready("mock", Arc::new(listener)),
        )
        .build();

    emitter.emit(&received()).await.unwrap();
}

mod lazy_tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_is_built_on_first_invocation_only() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let builds = Arc::new(AtomicUsize::new(0));
        let lazy = {
            let journal = journal.clone();
            let builds = builds.clone();
            LazyListener::new("lazy", move || {
                let journal = journal.clone();
                let builds = builds.clone();
                async move {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(JournalListener {
                        name: "lazy",
                        journal,
                        fail: false,
                    }) as Arc<dyn Listener>)
                }
            })
        };
        let emitter = EventEmitter::builder()
            .add_listener(EventKind::WebHookReceived, lazy.clone())
            .build();

        assert!(!lazy.is_resolved());
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        emitter.emit(&received()).await.unwrap();
        emitter.emit(&received()).await.unwrap();

        assert!(lazy.is_resolved());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(*journal.lock().unwrap(), vec!["lazy", "lazy"]);
    }

    #[tokio::test]
    async fn test_failed_construction_propagates_and_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let lazy = {
            let attempts = attempts.clone();
            LazyListener::new("broken", move || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<Arc<dyn Listener>, _>(RelayError::Internal {
                        message: "no store".to_string(),
                    })
                }
            })
        };
        let emitter = EventEmitter::builder()
            .add_listener(EventKind::WebHookReceived, lazy.clone())
            .build();

        assert!(emitter.emit(&received()).await.is_err());
        assert!(emitter.emit(&received()).await.is_err());

        assert!(!lazy.is_resolved());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}

mod provider_tests {
    use super::*;

    struct FixedProvider {
        listeners: Vec<ListenerRef>,
    }

    impl ListenerProvider for FixedProvider {
        fn provide_listeners(&self) -> Vec<(EventKind, Vec<ListenerRef>)> {
            vec![(EventKind::WebHookReceived, self.listeners.clone())]
        }
    }

    #[tokio::test]
    async fn test_provider_bindings_are_appended_in_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let provider = FixedProvider {
            listeners: vec![
                journal_listener("b", &journal, false),
                journal_listener("c", &journal, false),
            ],
        };
        let emitter = EventEmitter::builder()
            .add_listener(EventKind::WebHookReceived, journal_listener("a", &journal, false))
            .use_listener_provider(&provider)
            .build();

        emitter.emit(&received()).await.unwrap();

        assert_eq!(*journal.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(emitter.listener_count(EventKind::WebHookReceived), 3);
    }

    #[test]
    fn test_manifest_lists_listener_ids_per_event() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let emitter = EventEmitter::builder()
            .add_listener(EventKind::WebHookReceived, journal_listener("persist", &journal, false))
            .add_listener(EventKind::WebHookReceived, journal_listener("log", &journal, false))
            .build();

        let manifest = emitter.manifest();

        assert_eq!(
            manifest.get("WebHook/Received"),
            Some(&vec!["persist".to_string(), "log".to_string()])
        );
    }
}

//! Event-stream listener that connects the detector to a pipeline handler.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use assist_core::{async_trait, ActionKind, Fingerprint, RawEvent};
use futures::{Stream, StreamExt};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::detector::{DoubleActionSignal, TriggerDetector};

/// Receives fired double actions.
///
/// Called on a spawned task, never on the capture path, so implementations
/// are free to do blocking network work.
#[async_trait]
pub trait SignalHandler: Send + Sync + 'static {
    /// Handle one fired signal.
    async fn handle(&self, signal: DoubleActionSignal);

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// What the listener did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    /// The event was absorbed by the detector (armed or re-armed).
    Observed { kind: ActionKind },
    /// A double action fired and a pipeline was started.
    Dispatched {
        kind: ActionKind,
        fingerprint: Fingerprint,
    },
    /// A double action fired while a pipeline for the same kind was running.
    Dropped {
        kind: ActionKind,
        fingerprint: Fingerprint,
    },
}

/// Counters accumulated over a listener run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub observed: usize,
    pub dispatched: usize,
    pub dropped: usize,
}

/// Marks a kind as having a pipeline in flight until dropped.
struct InFlightGuard {
    kinds: Arc<Mutex<HashSet<ActionKind>>>,
    kind: ActionKind,
}

impl InFlightGuard {
    fn claim(kinds: &Arc<Mutex<HashSet<ActionKind>>>, kind: &ActionKind) -> Option<Self> {
        let mut set = match kinds.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !set.insert(kind.clone()) {
            return None;
        }
        Some(Self {
            kinds: Arc::clone(kinds),
            kind: kind.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = match self.kinds.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        set.remove(&self.kind);
    }
}

/// Consumes an ordered stream of [`RawEvent`]s.
///
/// Events are fed to the detector inline, in arrival order. Each fired
/// signal is handed to the handler on its own task. At most one pipeline
/// runs per action kind; a signal for a kind that is still in flight is
/// dropped.
pub struct TriggerListener<H: SignalHandler> {
    detector: TriggerDetector,
    handler: Arc<H>,
    in_flight: Arc<Mutex<HashSet<ActionKind>>>,
    tasks: JoinSet<()>,
    stats: ListenerStats,
}

impl<H: SignalHandler> TriggerListener<H> {
    /// Create a listener.
    pub fn new(detector: TriggerDetector, handler: H) -> Self {
        Self::with_shared_handler(detector, Arc::new(handler))
    }

    /// Create a listener around a handler that is also used elsewhere.
    pub fn with_shared_handler(detector: TriggerDetector, handler: Arc<H>) -> Self {
        Self {
            detector,
            handler,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            tasks: JoinSet::new(),
            stats: ListenerStats::default(),
        }
    }

    /// Get a reference to the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get a reference to the detector.
    pub fn detector(&self) -> &TriggerDetector {
        &self.detector
    }

    /// Counters so far.
    pub fn stats(&self) -> ListenerStats {
        self.stats
    }

    /// Whether a pipeline for `kind` is currently running.
    pub fn is_in_flight(&self, kind: &ActionKind) -> bool {
        match self.in_flight.lock() {
            Ok(set) => set.contains(kind),
            Err(poisoned) => poisoned.into_inner().contains(kind),
        }
    }

    /// Process one event. Must be called from within a Tokio runtime.
    pub fn on_event(&mut self, event: RawEvent) -> ListenerEvent {
        self.reap_finished();
        self.stats.observed += 1;

        let kind = event.kind.clone();
        let Some(signal) = self.detector.observe(event) else {
            return ListenerEvent::Observed { kind };
        };

        let fingerprint = signal.fingerprint.clone();
        let Some(guard) = InFlightGuard::claim(&self.in_flight, &kind) else {
            warn!(
                "Dropping double {}: a pipeline for this kind is still running",
                kind
            );
            self.stats.dropped += 1;
            return ListenerEvent::Dropped { kind, fingerprint };
        };

        debug!("Dispatching double {} to {}", kind, self.handler.name());
        let handler = Arc::clone(&self.handler);
        self.tasks.spawn(async move {
            let _guard = guard;
            handler.handle(signal).await;
        });
        self.stats.dispatched += 1;

        ListenerEvent::Dispatched { kind, fingerprint }
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                error!("Pipeline task failed: {}", e);
            }
        }
    }

    /// Wait for every in-flight pipeline to finish.
    pub async fn drain(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!("Pipeline task failed: {}", e);
            }
        }
    }

    /// Run until the event stream ends, then wait for in-flight pipelines.
    pub async fn run<S>(self, events: S) -> ListenerStats
    where
        S: Stream<Item = RawEvent> + Send,
    {
        self.run_with_callback(events, |_| {}).await
    }

    /// Run until the stream ends, reporting each processed event.
    pub async fn run_with_callback<S, F>(mut self, events: S, mut callback: F) -> ListenerStats
    where
        S: Stream<Item = RawEvent> + Send,
        F: FnMut(&ListenerEvent) + Send,
    {
        info!("Starting trigger listener with handler: {}", self.handler.name());

        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            let outcome = self.on_event(event);
            callback(&outcome);
        }

        info!("Event stream ended, waiting for in-flight pipelines");
        self.drain().await;
        self.stats
    }

    /// Run with graceful shutdown support.
    ///
    /// This method runs until either the shutdown future completes or the
    /// event stream ends. In both cases in-flight pipelines are awaited.
    pub async fn run_with_shutdown<S, F>(mut self, events: S, shutdown_signal: F) -> ListenerStats
    where
        S: Stream<Item = RawEvent> + Send,
        F: Future<Output = ()> + Send,
    {
        info!(
            "Starting trigger listener with handler: {} (graceful shutdown enabled)",
            self.handler.name()
        );

        futures::pin_mut!(events);
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping trigger listener");
                    break;
                }

                next = events.next() => {
                    match next {
                        Some(event) => {
                            self.on_event(event);
                        }
                        None => {
                            info!("Event stream ended");
                            break;
                        }
                    }
                }
            }
        }

        self.drain().await;
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::ContentPayload;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SignalHandler for CountingHandler {
        async fn handle(&self, _signal: DoubleActionSignal) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "CountingHandler"
        }
    }

    fn copy(text: &str, at: u64) -> RawEvent {
        RawEvent::new(ActionKind::Copy, ContentPayload::text(text), at)
    }

    #[tokio::test]
    async fn test_on_event_outcomes() {
        let detector = TriggerDetector::new(Duration::from_millis(800));
        let mut listener = TriggerListener::new(detector, CountingHandler::default());

        assert_eq!(
            listener.on_event(copy("a", 0)),
            ListenerEvent::Observed {
                kind: ActionKind::Copy
            }
        );
        assert!(matches!(
            listener.on_event(copy("a", 10)),
            ListenerEvent::Dispatched { .. }
        ));

        listener.drain().await;
        assert_eq!(listener.handler().calls.load(Ordering::SeqCst), 1);
        assert!(!listener.is_in_flight(&ActionKind::Copy));
        assert_eq!(
            listener.stats(),
            ListenerStats {
                observed: 2,
                dispatched: 1,
                dropped: 0
            }
        );
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let kinds = Arc::new(Mutex::new(HashSet::new()));

        let guard = InFlightGuard::claim(&kinds, &ActionKind::Copy).unwrap();
        assert!(InFlightGuard::claim(&kinds, &ActionKind::Copy).is_none());
        assert!(InFlightGuard::claim(&kinds, &ActionKind::Select).is_some());

        drop(guard);
        assert!(InFlightGuard::claim(&kinds, &ActionKind::Copy).is_some());
    }
}

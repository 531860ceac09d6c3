//! Per-kind Idle/Armed state machine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assist_core::{ActionKind, ContentPayload, Fingerprint, RawEvent};
use tracing::{debug, info};

/// Default trigger window (τ).
pub const DEFAULT_TRIGGER_WINDOW: Duration = Duration::from_millis(800);

/// Detector state for one action kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionWindow {
    /// No qualifying event is waiting for its pair.
    #[default]
    Idle,
    /// One event has been seen and waits for a matching second one.
    Armed {
        last_fingerprint: Fingerprint,
        last_timestamp_ms: u64,
    },
}

impl ActionWindow {
    /// Whether the window holds a pending event.
    pub fn is_armed(&self) -> bool {
        matches!(self, ActionWindow::Armed { .. })
    }
}

/// Emitted when two matching events of the same kind land within the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleActionSignal {
    /// The action kind that was repeated.
    pub kind: ActionKind,
    /// Identity of the repeated content.
    pub fingerprint: Fingerprint,
    /// The content carried by the second event.
    pub content: ContentPayload,
    /// Time between the two events, in milliseconds.
    pub elapsed_ms: u64,
}

/// Recognizes a double action per action kind.
///
/// Pure and synchronous: no I/O and no awaiting, so it can run inline on
/// the capture path. Each kind has its own window; kinds never interfere.
#[derive(Debug)]
pub struct TriggerDetector {
    window: Duration,
    windows: HashMap<ActionKind, ActionWindow>,
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_WINDOW)
    }
}

impl TriggerDetector {
    /// Create a detector with the given trigger window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            windows: HashMap::new(),
        }
    }

    /// The configured trigger window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current state for a kind. Kinds never observed are idle.
    pub fn state(&self, kind: &ActionKind) -> ActionWindow {
        self.windows.get(kind).cloned().unwrap_or_default()
    }

    /// Feed one event; returns a signal when it completes a double action.
    ///
    /// A fire clears the window, so a third identical event re-arms instead
    /// of firing again.
    pub fn observe(&mut self, event: RawEvent) -> Option<DoubleActionSignal> {
        let window_ms = self.window.as_millis() as u64;
        let state = self.windows.entry(event.kind.clone()).or_default();

        let elapsed = match state {
            ActionWindow::Armed {
                last_fingerprint,
                last_timestamp_ms,
            } if *last_fingerprint == event.fingerprint => {
                // A timestamp earlier than the armed one never pairs.
                event.timestamp_ms.checked_sub(*last_timestamp_ms)
            }
            _ => None,
        };

        match elapsed {
            Some(elapsed_ms) if elapsed_ms <= window_ms => {
                *state = ActionWindow::Idle;
                info!(
                    "Double {} detected ({} ms apart, fingerprint {})",
                    event.kind,
                    elapsed_ms,
                    event.fingerprint.short()
                );
                Some(DoubleActionSignal {
                    kind: event.kind,
                    fingerprint: event.fingerprint,
                    content: event.content,
                    elapsed_ms,
                })
            }
            _ => {
                debug!(
                    "Armed {} window with fingerprint {}",
                    event.kind,
                    event.fingerprint.short()
                );
                *state = ActionWindow::Armed {
                    last_fingerprint: event.fingerprint,
                    last_timestamp_ms: event.timestamp_ms,
                };
                None
            }
        }
    }

    /// Clear the window for one kind.
    pub fn reset(&mut self, kind: &ActionKind) {
        if let Some(state) = self.windows.get_mut(kind) {
            *state = ActionWindow::Idle;
        }
    }

    /// Clear every window.
    pub fn reset_all(&mut self) {
        for state in self.windows.values_mut() {
            *state = ActionWindow::Idle;
        }
    }
}

/// A detector that can be fed from several event sources.
///
/// Access to the windows is serialized behind a mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedDetector {
    inner: Arc<Mutex<TriggerDetector>>,
}

impl SharedDetector {
    /// Wrap a detector for shared use.
    pub fn new(detector: TriggerDetector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(detector)),
        }
    }

    /// Feed one event. See [`TriggerDetector::observe`].
    pub fn observe(&self, event: RawEvent) -> Option<DoubleActionSignal> {
        let mut detector = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        detector.observe(event)
    }

    /// Current state for a kind.
    pub fn state(&self, kind: &ActionKind) -> ActionWindow {
        match self.inner.lock() {
            Ok(guard) => guard.state(kind),
            Err(poisoned) => poisoned.into_inner().state(kind),
        }
    }
}

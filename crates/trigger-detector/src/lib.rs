//! Double-action trigger detection for doubletap.
//!
//! This crate recognizes "the same action repeated on the same content within
//! a short window" in a stream of [`RawEvent`]s and hands each fired
//! [`DoubleActionSignal`] to a [`SignalHandler`] off the capture path.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use trigger_detector::{ActionKind, ContentPayload, RawEvent, TriggerDetector};
//!
//! let mut detector = TriggerDetector::new(Duration::from_millis(800));
//!
//! let first = RawEvent::new(ActionKind::Copy, ContentPayload::text("Hello"), 1_000);
//! let second = RawEvent::new(ActionKind::Copy, ContentPayload::text("Hello"), 1_400);
//!
//! assert!(detector.observe(first).is_none());
//! let signal = detector.observe(second).expect("double copy fires");
//! assert_eq!(signal.kind, ActionKind::Copy);
//! ```

mod detector;
mod listener;

pub use detector::{
    ActionWindow, DoubleActionSignal, SharedDetector, TriggerDetector, DEFAULT_TRIGGER_WINDOW,
};
pub use listener::{ListenerEvent, ListenerStats, SignalHandler, TriggerListener};

// Re-export event types for users
pub use assist_core::{ActionKind, ContentPayload, Fingerprint, RawEvent};

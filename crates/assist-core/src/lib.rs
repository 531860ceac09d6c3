//! Core types and service traits for the doubletap pipeline.
//!
//! This crate provides the shared vocabulary used by the trigger detector,
//! the remote API client and the orchestrator:
//!
//! - [`RawEvent`] / [`Fingerprint`] - Observed user actions and their identity
//! - [`ContentPayload`] / [`ContentType`] - What the user acted on
//! - [`Action`] - What the user wants done with it
//! - [`ChatMessage`] / [`CompletionRequest`] - Completion request types
//! - [`PipelineError`] / [`PipelineResult`] - Error taxonomy and terminal result
//! - [`CompletionService`] / [`ExtractionService`] - Remote service seams
//!
//! # Example
//!
//! ```rust
//! use assist_core::{ActionKind, ContentPayload, RawEvent};
//!
//! let first = RawEvent::new(ActionKind::Copy, ContentPayload::text("Hello"), 1_000);
//! let second = RawEvent::new(ActionKind::Copy, ContentPayload::text("Hello"), 1_300);
//! assert_eq!(first.fingerprint, second.fingerprint);
//! ```

mod action;
mod content;
mod error;
mod event;
mod message;
mod services;

pub use action::{Action, ActionKind};
pub use content::{ContentPayload, ContentType, ImageFormat};
pub use error::{ErrorCategory, ErrorKind, PipelineError, PipelineResult};
pub use event::{Fingerprint, RawEvent};
pub use message::{
    ChatMessage, CompletionChoice, CompletionRequest, CompletionResponse, ModelProfile, Role,
    TokenUsage,
};
pub use services::{CompletionService, ExtractionService, UploadedFile};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

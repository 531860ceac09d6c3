//! Content pipeline for doubletap.
//!
//! This crate provides the [`Orchestrator`] type which turns a piece of
//! content plus an [`Action`] into a single [`PipelineResult`], and the
//! [`TriggerDispatcher`] which runs it for every fired double action.
//!
//! # Features
//!
//! - Classifies text, file lists and clipboard images
//! - Reads text files locally and uploads everything else for extraction
//! - Removes temporary image files on every exit path
//! - Picks a light or heavy model depending on how content was ingested
//! - Reports every failure as a typed result, never as a panic
//!
//! # Architecture
//!
//! ```text
//! DoubleActionSignal (from trigger-detector)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  0. Check API key (no I/O without it)                       │
//! │         ↓                                                   │
//! │  1. Classify payload → Text | FilePaths | Image             │
//! │         ↓                                                   │
//! │  2. Ingest                                                  │
//! │     • text   → pass through                                 │
//! │     • files  → read locally or upload + extract             │
//! │     • image  → temp file → upload + extract → delete        │
//! │         ↓                                                   │
//! │  3. Select model (light / heavy)                            │
//! │         ↓                                                   │
//! │  4. Build prompt [System, System?, User]                    │
//! │         ↓                                                   │
//! │  5. Dispatch completion → first choice text                 │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! PipelineResult → ResultSink
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{Action, AssistConfig, ContentPayload, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AssistConfig::builder().api_key("sk-...").build();
//!     let orchestrator = Orchestrator::from_config(config)?;
//!
//!     let result = orchestrator
//!         .execute(ContentPayload::text("Hello"), Action::Translate, None)
//!         .await;
//!
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

mod classifier;
mod config;
mod dispatch;
mod dispatcher;
mod error;
mod ingestor;
mod model_selection;
mod orchestrator;
mod prompt;
mod sink;

// Public exports
pub use classifier::{classify, resolve, ClipboardSnapshot};
pub use config::{
    AssistConfig, AssistConfigBuilder, DEFAULT_HEAVY_CONTEXT, DEFAULT_HEAVY_MODEL,
    DEFAULT_LIGHT_CONTEXT, DEFAULT_LIGHT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TEXT_EXTENSIONS,
    DEFAULT_TRANSLATE_TARGET,
};
pub use dispatch::{default_bindings, TriggerDispatcher};
pub use dispatcher::AiDispatcher;
pub use error::OrchestratorError;
pub use ingestor::{ContentIngestor, IngestedContent};
pub use model_selection::ModelSelector;
pub use orchestrator::Orchestrator;
pub use prompt::{PromptBuilder, DEFAULT_PERSONA};
pub use sink::{CollectingSink, JsonLinesSink, LoggingSink, NoOpSink, ResultSink, TriggerOutcome};

// Re-export commonly used types from dependencies
pub use assist_core::{
    Action, ActionKind, ContentPayload, ContentType, ErrorKind, ImageFormat, PipelineError,
    PipelineResult,
};
pub use kimi_client::{KimiClient, KimiConfig};

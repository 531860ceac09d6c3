//! Moonshot/Kimi API client.
//!
//! This crate provides [`KimiClient`], an HTTP client for the
//! OpenAI-compatible Moonshot API. It implements both remote seams used by
//! the doubletap pipeline:
//!
//! - [`CompletionService`] via `POST /chat/completions`
//! - [`ExtractionService`] via `POST /files` (`purpose=file-extract`),
//!   `GET /files/{id}/content` and `DELETE /files/{id}`
//!
//! No request is retried; every failure is returned to the caller as a
//! [`PipelineError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use kimi_client::{KimiClient, KimiConfig};
//!
//! # fn example() -> Result<(), assist_core::PipelineError> {
//! let config = KimiConfig::builder().api_key("sk-...").build();
//! let client = KimiClient::new(config)?;
//! # Ok(())
//! # }
//! ```

mod api_types;
mod client;
mod config;

pub use client::KimiClient;
pub use config::{KimiConfig, KimiConfigBuilder, DEFAULT_API_URL};

// Re-export the service traits for convenience
pub use assist_core::{CompletionService, ExtractionService, PipelineError, UploadedFile};

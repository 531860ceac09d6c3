//! Mock remote services for doubletap pipeline tests.
//!
//! This crate provides in-memory implementations of the service traits:
//! - `EchoCompletion` - Answers with a fixed reply or echoes the user message
//! - `ScriptedExtraction` - Returns configured extraction results
//! - `DelayedCompletion` - Wraps another completion service with artificial delay
//!
//! Every mock counts its calls so tests can assert that no network-like
//! work happened.
//!
//! # Example
//!
//! ```rust
//! use mock_services::{ChatMessage, CompletionRequest, CompletionService, EchoCompletion};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_services::PipelineError> {
//!     let service = EchoCompletion::with_reply("Bonjour");
//!     let request = CompletionRequest {
//!         model: "moonshot-v1-8k".to_string(),
//!         messages: vec![ChatMessage::user("Hello")],
//!         temperature: 0.3,
//!         max_tokens: None,
//!     };
//!
//!     let response = service.complete(request).await?;
//!     assert_eq!(response.first_text(), Some("Bonjour"));
//!     assert_eq!(service.call_count(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod extraction;

// Re-export core types for convenience
pub use assist_core::{
    async_trait, ChatMessage, CompletionRequest, CompletionResponse, CompletionService,
    ExtractionService, PipelineError, UploadedFile,
};

pub use delayed::DelayedCompletion;
pub use echo::EchoCompletion;
pub use extraction::{ExtractionBehavior, ScriptedExtraction, UploadRecord};

//! Error types for result delivery.

use thiserror::Error;

/// Errors that can occur while handing results to the outside world.
///
/// Pipeline failures themselves are never errors here; they travel inside
/// a [`PipelineResult`](assist_core::PipelineResult).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Result delivery failed.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// A result could not be encoded.
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

//! Remote service seams used by the pipeline.
//!
//! The pipeline talks to two logical remote calls: "extract text from an
//! uploaded file" and "produce a chat completion". Both are traits so the
//! orchestrator can run against the real HTTP client or an in-memory double.
//! Implementations must not retry; failures propagate immediately.

use std::path::Path;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::message::{CompletionRequest, CompletionResponse};

/// A file that has been accepted by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Identifier assigned by the remote service.
    pub remote_id: String,
    /// Original file name.
    pub filename: String,
    /// Size in bytes as reported by the service.
    pub bytes: u64,
}

/// Produces chat completions.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion request.
    ///
    /// Transport, authentication and server errors map to
    /// [`PipelineError::ApiCallFailed`]; undecodable bodies map to
    /// [`PipelineError::MalformedResponse`].
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, PipelineError>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Uploads files and returns their extracted plain text.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Upload a local file for extraction.
    async fn upload(&self, path: &Path) -> Result<UploadedFile, PipelineError>;

    /// Fetch the extracted text for an uploaded file.
    async fn extracted_text(&self, file: &UploadedFile) -> Result<String, PipelineError>;

    /// Delete an uploaded file from the remote service.
    ///
    /// Default implementation does nothing.
    async fn delete(&self, file: &UploadedFile) -> Result<(), PipelineError> {
        let _ = file;
        Ok(())
    }

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

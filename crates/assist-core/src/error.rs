//! Error taxonomy and the terminal pipeline result.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level grouping of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Config,
    Validation,
    Remote,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Remote => "remote",
        };
        f.write_str(name)
    }
}

/// Flat error kind carried by a failed [`PipelineResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ApiKeyMissing,
    EmptyContent,
    UnsupportedType,
    FileNotFound,
    UploadFailed,
    ExtractionEmpty,
    ApiCallFailed,
    MalformedResponse,
}

impl ErrorKind {
    /// The category this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::ApiKeyMissing => ErrorCategory::Config,
            ErrorKind::EmptyContent | ErrorKind::UnsupportedType | ErrorKind::FileNotFound => {
                ErrorCategory::Validation
            }
            ErrorKind::UploadFailed
            | ErrorKind::ExtractionEmpty
            | ErrorKind::ApiCallFailed
            | ErrorKind::MalformedResponse => ErrorCategory::Remote,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ApiKeyMissing => "api_key_missing",
            ErrorKind::EmptyContent => "empty_content",
            ErrorKind::UnsupportedType => "unsupported_type",
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::UploadFailed => "upload_failed",
            ErrorKind::ExtractionEmpty => "extraction_empty",
            ErrorKind::ApiCallFailed => "api_call_failed",
            ErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by each pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No API credential is configured.
    #[error("API key not configured: {0}")]
    ApiKeyMissing(String),

    /// The request would carry no actionable text.
    #[error("no usable content: {0}")]
    EmptyContent(String),

    /// The payload is not text, files or an image.
    #[error("unsupported content: {0}")]
    UnsupportedType(String),

    /// A file path does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Uploading a file or retrieving its extracted content failed.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The extraction service returned no text.
    #[error("extraction returned no text: {0}")]
    ExtractionEmpty(String),

    /// The completion call failed (transport, auth or server error).
    #[error("API call failed: {0}")]
    ApiCallFailed(String),

    /// The completion response did not contain the expected text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl PipelineError {
    /// The flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ApiKeyMissing(_) => ErrorKind::ApiKeyMissing,
            PipelineError::EmptyContent(_) => ErrorKind::EmptyContent,
            PipelineError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            PipelineError::FileNotFound(_) => ErrorKind::FileNotFound,
            PipelineError::UploadFailed(_) => ErrorKind::UploadFailed,
            PipelineError::ExtractionEmpty(_) => ErrorKind::ExtractionEmpty,
            PipelineError::ApiCallFailed(_) => ErrorKind::ApiCallFailed,
            PipelineError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

/// Terminal value of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    /// The completion text.
    Success { text: String },
    /// The first failure encountered.
    Failure { kind: ErrorKind, message: String },
}

impl PipelineResult {
    pub fn success(text: impl Into<String>) -> Self {
        PipelineResult::Success { text: text.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }

    /// The error kind, if this is a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            PipelineResult::Success { .. } => None,
            PipelineResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<PipelineError> for PipelineResult {
    fn from(err: PipelineError) -> Self {
        PipelineResult::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<Result<String, PipelineError>> for PipelineResult {
    fn from(result: Result<String, PipelineError>) -> Self {
        match result {
            Ok(text) => PipelineResult::Success { text },
            Err(err) => err.into(),
        }
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineResult::Success { text } => f.write_str(text),
            PipelineResult::Failure { kind, message } => {
                write!(f, "{} error ({}): {}", kind.category(), kind, message)
            }
        }
    }
}

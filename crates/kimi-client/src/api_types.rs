//! Moonshot API request and response types.

use assist_core::{ChatMessage, CompletionChoice, CompletionResponse, TokenUsage};
use serde::{Deserialize, Serialize};

/// Chat completion request to the Moonshot API.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    /// Model to use
    pub model: &'a str,
    /// Messages in the conversation
    pub messages: &'a [ChatMessage],
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat completion response from the Moonshot API.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response ID
    #[serde(default)]
    pub id: String,
    /// Model used
    #[serde(default)]
    pub model: String,
    /// Response choices
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage
    pub usage: Option<Usage>,
}

/// A response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Choice index
    #[serde(default)]
    pub index: u32,
    /// The message
    pub message: Option<ResponseMessage>,
    /// Finish reason
    pub finish_reason: Option<String>,
}

/// Response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Role
    #[serde(default)]
    pub role: String,
    /// Content (may be null)
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<ChatCompletionResponse> for CompletionResponse {
    fn from(response: ChatCompletionResponse) -> Self {
        CompletionResponse {
            model: response.model,
            choices: response
                .choices
                .into_iter()
                .map(|choice| CompletionChoice {
                    index: choice.index,
                    content: choice.message.and_then(|m| m.content),
                    finish_reason: choice.finish_reason,
                })
                .collect(),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        }
    }
}

/// A file object returned by `POST /files`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    /// File ID
    pub id: String,
    /// Size in bytes
    #[serde(default)]
    pub bytes: u64,
    /// File name
    #[serde(default)]
    pub filename: String,
    /// Upload purpose
    #[serde(default)]
    pub purpose: String,
    /// Processing status
    pub status: Option<String>,
}

/// Extracted content returned by `GET /files/{id}/content`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    /// Extracted plain text
    #[serde(default)]
    pub content: String,
    /// Detected file type
    pub file_type: Option<String>,
    /// File name
    pub filename: Option<String>,
}

impl FileContent {
    /// Extract text from a content response body.
    ///
    /// The service answers with a JSON document carrying a `content` field;
    /// any other body is taken verbatim.
    pub fn text_from_body(body: &str) -> String {
        match serde_json::from_str::<FileContent>(body) {
            Ok(parsed) => parsed.content,
            Err(_) => body.to_string(),
        }
    }
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

/// Describe a non-success HTTP response for an error message.
pub fn describe_error(status: u16, body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return match api_error.error.error_type {
            Some(kind) => format!("API error ({}, {}): {}", status, kind, api_error.error.message),
            None => format!("API error ({}): {}", status, api_error.error.message),
        };
    }
    format!("API error ({}): {}", status, body)
}

//! Completion request and response types.

use serde::{Deserialize, Serialize};

/// Role of a message in a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A named completion model and its context capacity in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub model_name: String,
    pub context_budget: usize,
}

impl ModelProfile {
    pub fn new(model_name: impl Into<String>, context_budget: usize) -> Self {
        Self {
            model_name: model_name.into(),
            context_budget,
        }
    }
}

/// A provider-neutral chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model to use.
    pub model: String,
    /// Ordered messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional cap on generated tokens.
    pub max_tokens: Option<u32>,
}

/// One completion choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionChoice {
    pub index: u32,
    /// Generated text; `None` if the provider returned no content.
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A provider-neutral chat completion response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResponse {
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Build a single-choice response. Mostly useful for test doubles.
    pub fn single(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            choices: vec![CompletionChoice {
                index: 0,
                content: Some(content.into()),
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        }
    }

    /// Text of the first choice, if present.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.content.as_deref())
    }
}

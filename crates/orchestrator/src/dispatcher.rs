//! Completion dispatch.

use std::sync::Arc;

use assist_core::{ChatMessage, CompletionRequest, CompletionService, ModelProfile, PipelineError};
use tracing::{debug, info};

use crate::config::DEFAULT_TEMPERATURE;

/// Runs one completion call and extracts the answer text.
pub struct AiDispatcher {
    service: Arc<dyn CompletionService>,
    temperature: f32,
}

impl AiDispatcher {
    /// Create a dispatcher with the default temperature.
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self::with_temperature(service, DEFAULT_TEMPERATURE)
    }

    pub fn with_temperature(service: Arc<dyn CompletionService>, temperature: f32) -> Self {
        Self {
            service,
            temperature,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Send `messages` to `profile`'s model and return the first choice's text.
    pub async fn complete(
        &self,
        profile: &ModelProfile,
        messages: Vec<ChatMessage>,
    ) -> Result<String, PipelineError> {
        let request = CompletionRequest {
            model: profile.model_name.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: None,
        };

        debug!(
            "Dispatching {} message(s) to {} via {}",
            request.messages.len(),
            request.model,
            self.service.name()
        );

        let response = self.service.complete(request).await?;

        match response.usage {
            Some(usage) => info!(
                "Dispatch done: model {} (prompt: {}, completion: {}, total: {} tokens)",
                response.model, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            ),
            None => info!("Dispatch done: model {}", response.model),
        }

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| {
                PipelineError::MalformedResponse(format!(
                    "{} returned no text in its first choice",
                    profile.model_name
                ))
            })
    }
}

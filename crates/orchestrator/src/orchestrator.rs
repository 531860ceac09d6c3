//! Main orchestrator that runs one content-processing request end to end.

use std::sync::Arc;
use std::time::Instant;

use assist_core::{
    Action, CompletionService, ContentPayload, ContentType, ExtractionService, PipelineError,
    PipelineResult,
};
use kimi_client::KimiClient;
use tracing::{debug, info, warn};

use crate::classifier;
use crate::config::AssistConfig;
use crate::dispatcher::AiDispatcher;
use crate::ingestor::ContentIngestor;
use crate::model_selection::ModelSelector;
use crate::prompt::PromptBuilder;

/// Runs the classify → ingest → select → prompt → dispatch pipeline.
///
/// The orchestrator:
/// - Refuses to run without an API key, before any I/O
/// - Classifies the payload unless the caller already knows its type
/// - Reads or uploads files and images, always removing temporary copies
/// - Picks the light or heavy model depending on how content was ingested
/// - Returns exactly one [`PipelineResult`] per call
pub struct Orchestrator {
    config: AssistConfig,
    ingestor: ContentIngestor,
    selector: ModelSelector,
    prompts: PromptBuilder,
    dispatcher: AiDispatcher,
}

impl Orchestrator {
    /// Create an orchestrator over explicit service implementations.
    pub fn new(
        config: AssistConfig,
        completion: Arc<dyn CompletionService>,
        extraction: Arc<dyn ExtractionService>,
    ) -> Self {
        Self {
            ingestor: ContentIngestor::from_config(extraction, &config),
            selector: ModelSelector::from_config(&config),
            prompts: PromptBuilder::from_config(&config),
            dispatcher: AiDispatcher::with_temperature(completion, config.temperature),
            config,
        }
    }

    /// Create an orchestrator backed by the Kimi HTTP API.
    pub fn from_config(config: AssistConfig) -> Result<Self, PipelineError> {
        let client = Arc::new(KimiClient::new(config.kimi_config())?);
        Ok(Self::new(
            config,
            Arc::clone(&client) as Arc<dyn CompletionService>,
            client as Arc<dyn ExtractionService>,
        ))
    }

    /// Create an orchestrator from environment variables.
    ///
    /// See [`AssistConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_config(AssistConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// Process one piece of content.
    ///
    /// When `content_type` is `None` the payload is classified first; when
    /// given it must agree with the payload.
    pub async fn execute(
        &self,
        content: ContentPayload,
        action: Action,
        content_type: Option<ContentType>,
    ) -> PipelineResult {
        let started = Instant::now();
        info!("Executing {} on {}", action, content.describe());

        let result: PipelineResult = self.run(content, action, content_type).await.into();

        match &result {
            PipelineResult::Success { text } => info!(
                "Pipeline succeeded in {} ms ({} chars)",
                started.elapsed().as_millis(),
                text.chars().count()
            ),
            PipelineResult::Failure { kind, message } => warn!(
                "Pipeline failed in {} ms with {}: {}",
                started.elapsed().as_millis(),
                kind,
                message
            ),
        }

        result
    }

    async fn run(
        &self,
        content: ContentPayload,
        action: Action,
        content_type: Option<ContentType>,
    ) -> Result<String, PipelineError> {
        if !self.config.has_api_key() {
            return Err(PipelineError::ApiKeyMissing(
                "set KIMI_API_KEY to enable the assistant".to_string(),
            ));
        }

        let content_type = classifier::resolve(&content, content_type)?;
        info!("Classification done: {}", content_type);

        // Temporary files are owned by the ingestor and gone once it returns.
        let ingested = self.ingestor.ingest(content, content_type).await?;

        let profile = self
            .selector
            .select(ingested.content_type, ingested.used_remote_ingestion);
        info!(
            "Model selected: {} (context budget: {} tokens)",
            profile.model_name, profile.context_budget
        );

        let messages = self.prompts.build(action, &ingested, profile)?;
        debug!("Built {} prompt message(s)", messages.len());

        self.dispatcher.complete(profile, messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::ErrorKind;
    use mock_services::{EchoCompletion, ScriptedExtraction};

    fn orchestrator(
        config: AssistConfig,
        completion: &Arc<EchoCompletion>,
        extraction: &Arc<ScriptedExtraction>,
    ) -> Orchestrator {
        Orchestrator::new(
            config,
            Arc::clone(completion) as Arc<dyn CompletionService>,
            Arc::clone(extraction) as Arc<dyn ExtractionService>,
        )
    }

    #[tokio::test]
    async fn test_execute_classifies_when_type_omitted() {
        let completion = Arc::new(EchoCompletion::with_reply("done"));
        let extraction = Arc::new(ScriptedExtraction::with_text("unused"));
        let orchestrator = orchestrator(
            AssistConfig::builder().api_key("sk-test").build(),
            &completion,
            &extraction,
        );

        let result = orchestrator
            .execute(ContentPayload::text("Hello"), Action::Explain, None)
            .await;

        assert_eq!(result, PipelineResult::success("done"));
        assert_eq!(completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_rejects_declared_type_mismatch() {
        let completion = Arc::new(EchoCompletion::new());
        let extraction = Arc::new(ScriptedExtraction::with_text("unused"));
        let orchestrator = orchestrator(
            AssistConfig::builder().api_key("sk-test").build(),
            &completion,
            &extraction,
        );

        let result = orchestrator
            .execute(
                ContentPayload::text("Hello"),
                Action::Explain,
                Some(ContentType::FilePaths),
            )
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::UnsupportedType));
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_text_is_empty_content() {
        let completion = Arc::new(EchoCompletion::new());
        let extraction = Arc::new(ScriptedExtraction::with_text("unused"));
        let orchestrator = orchestrator(
            AssistConfig::builder().api_key("sk-test").build(),
            &completion,
            &extraction,
        );

        let result = orchestrator
            .execute(ContentPayload::text("   "), Action::Translate, None)
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::EmptyContent));
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_config_temperature_reaches_request() {
        let completion = Arc::new(EchoCompletion::with_reply("ok"));
        let extraction = Arc::new(ScriptedExtraction::with_text("unused"));
        let orchestrator = orchestrator(
            AssistConfig::builder()
                .api_key("sk-test")
                .temperature(0.1)
                .build(),
            &completion,
            &extraction,
        );

        orchestrator
            .execute(ContentPayload::text("Hello"), Action::Summarize, None)
            .await;

        assert_eq!(completion.last_request().unwrap().temperature, 0.1);
    }

    #[test]
    fn test_from_config_builds_http_client() {
        let orchestrator = Orchestrator::from_config(AssistConfig::default()).unwrap();
        assert!(!orchestrator.config().has_api_key());
    }
}

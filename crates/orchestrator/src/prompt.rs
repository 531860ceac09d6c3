//! Prompt construction.

use assist_core::{Action, ChatMessage, ModelProfile, PipelineError};
use tracing::warn;

use crate::config::{AssistConfig, DEFAULT_TRANSLATE_TARGET};
use crate::ingestor::IngestedContent;

/// Fixed assistant persona sent as the first system message.
pub const DEFAULT_PERSONA: &str =
    "You are Kimi, a professional assistant. You always give concise answers without filler.";

/// Rough conversion between tokens and characters.
const CHARS_PER_TOKEN: usize = 4;

/// Tokens kept free for the persona, the instruction and the answer.
const RESERVED_TOKENS: usize = 1024;

const CONTENT_START: &str = "--- content start ---";
const CONTENT_END: &str = "--- content end ---";
const TRUNCATION_MARKER: &str = "\n[content truncated]";

/// Builds the ordered message list for one completion call.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    translate_target: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA, DEFAULT_TRANSLATE_TARGET)
    }
}

impl PromptBuilder {
    pub fn new(persona: impl Into<String>, translate_target: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            translate_target: translate_target.into(),
        }
    }

    pub fn from_config(config: &AssistConfig) -> Self {
        Self::new(DEFAULT_PERSONA, config.translate_target.clone())
    }

    /// The action-specific task description.
    pub fn instruction(&self, action: Action) -> String {
        match action {
            Action::Translate => {
                let fallback = if self.translate_target.eq_ignore_ascii_case("english") {
                    "Chinese"
                } else {
                    "English"
                };
                format!(
                    "Translate it into {} (if it is already in {}, translate it into {})",
                    self.translate_target, self.translate_target, fallback
                )
            }
            Action::Explain => "Explain this content".to_string(),
            Action::Summarize => "Briefly summarize the key points".to_string(),
            Action::Analyze => "Analyze this content".to_string(),
        }
    }

    /// Build `[System(persona), System(context)?, User(instruction)]`.
    ///
    /// Text payloads are embedded in the user message. File and image
    /// content is supplied as a second system message and the user message
    /// refers to it. Content larger than the profile's context budget is
    /// truncated.
    pub fn build(
        &self,
        action: Action,
        content: &IngestedContent,
        profile: &ModelProfile,
    ) -> Result<Vec<ChatMessage>, PipelineError> {
        let limit = char_limit(profile);
        let task = self.instruction(action);
        let mut messages = vec![ChatMessage::system(self.persona.clone())];

        match (&content.raw_text, &content.context_text) {
            (Some(raw), _) => {
                if raw.trim().is_empty() {
                    return Err(PipelineError::EmptyContent(
                        "text is empty or whitespace".to_string(),
                    ));
                }
                let raw = truncate(raw, limit, &profile.model_name);
                messages.push(ChatMessage::user(format!(
                    "You received content from {}.\nTask: {}.\n{}\n\n{}\n{}\n{}",
                    content.source, task, BREVITY, CONTENT_START, raw, CONTENT_END
                )));
            }
            (None, Some(context)) => {
                if context.trim().is_empty() {
                    return Err(PipelineError::EmptyContent(format!(
                        "{} contains no text",
                        content.source
                    )));
                }
                let context = truncate(context, limit, &profile.model_name);
                messages.push(ChatMessage::system(format!(
                    "Content from {}:\n{}\n{}\n{}",
                    content.source, CONTENT_START, context, CONTENT_END
                )));
                messages.push(ChatMessage::user(format!(
                    "You received content from {}, supplied above.\nTask: {}.\n{}",
                    content.source, task, BREVITY
                )));
            }
            (None, None) => {
                return Err(PipelineError::EmptyContent(
                    "nothing to send".to_string(),
                ));
            }
        }

        Ok(messages)
    }
}

const BREVITY: &str = "Requirement: the answer must be accurate and extremely brief.";

fn char_limit(profile: &ModelProfile) -> usize {
    let tokens = profile
        .context_budget
        .saturating_sub(RESERVED_TOKENS)
        .max(profile.context_budget / 2);
    tokens.saturating_mul(CHARS_PER_TOKEN)
}

fn truncate(text: &str, limit: usize, model: &str) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((cut, _)) => {
            warn!(
                "Content of {} chars exceeds the {} budget, truncating to {} chars",
                text.chars().count(),
                model,
                limit
            );
            let mut truncated = text[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::{ContentType, ErrorKind, Role};

    fn text(raw: &str) -> IngestedContent {
        IngestedContent {
            content_type: ContentType::Text,
            source: "clipboard text".to_string(),
            raw_text: Some(raw.to_string()),
            context_text: None,
            used_remote_ingestion: false,
        }
    }

    fn file(context: &str) -> IngestedContent {
        IngestedContent {
            content_type: ContentType::FilePaths,
            source: "file (report.pdf)".to_string(),
            raw_text: None,
            context_text: Some(context.to_string()),
            used_remote_ingestion: true,
        }
    }

    fn light() -> ModelProfile {
        ModelProfile::new("moonshot-v1-8k", 8192)
    }

    #[test]
    fn test_text_prompt_shape() {
        let builder = PromptBuilder::default();
        let messages = builder.build(Action::Translate, &text("Hello"), &light()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, DEFAULT_PERSONA);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("clipboard text"));
        assert!(messages[1].content.contains(&builder.instruction(Action::Translate)));
        assert!(messages[1]
            .content
            .ends_with("--- content start ---\nHello\n--- content end ---"));
    }

    #[test]
    fn test_file_prompt_shape() {
        let builder = PromptBuilder::default();
        let messages = builder
            .build(Action::Summarize, &file("quarterly numbers"), &light())
            .unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::System);
        assert!(messages[1].content.contains("quarterly numbers"));
        assert_eq!(messages[2].role, Role::User);
        assert!(messages[2].content.contains("Briefly summarize the key points"));
        assert!(!messages[2].content.contains("quarterly numbers"));
    }

    #[test]
    fn test_each_action_has_distinct_instruction() {
        let builder = PromptBuilder::default();
        let instructions: std::collections::HashSet<_> =
            Action::ALL.iter().map(|a| builder.instruction(*a)).collect();
        assert_eq!(instructions.len(), Action::ALL.len());
    }

    #[test]
    fn test_translate_target() {
        let builder = PromptBuilder::new(DEFAULT_PERSONA, "English");
        let instruction = builder.instruction(Action::Translate);
        assert!(instruction.contains("into English"));
        assert!(instruction.contains("into Chinese"));

        let default = PromptBuilder::default().instruction(Action::Translate);
        assert!(default.starts_with("Translate it into Chinese"));
    }

    #[test]
    fn test_empty_content() {
        let builder = PromptBuilder::default();

        let err = builder.build(Action::Explain, &text("  \n "), &light()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyContent);

        let err = builder.build(Action::Explain, &file(""), &light()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyContent);

        let mut nothing = text("x");
        nothing.raw_text = None;
        let err = builder.build(Action::Explain, &nothing, &light()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyContent);
    }

    #[test]
    fn test_context_truncated_to_budget() {
        let builder = PromptBuilder::default();
        let small = ModelProfile::new("tiny", 100);
        let long = "字".repeat(1_000);

        let messages = builder.build(Action::Summarize, &file(&long), &small).unwrap();
        let context = &messages[1].content;

        // 100 token budget keeps 50 tokens, about 200 chars.
        assert!(context.contains(TRUNCATION_MARKER));
        assert_eq!(context.matches('字').count(), 200);
    }

    #[test]
    fn test_short_content_untouched() {
        assert_eq!(truncate("short", 10, "m"), "short");
        assert_eq!(truncate("exactly10!", 10, "m"), "exactly10!");
        assert_eq!(truncate("eleven chars", 6, "m"), format!("eleven{}", TRUNCATION_MARKER));
    }
}

//! Model selection based on how the content was ingested.

use assist_core::{ContentType, ModelProfile};

use crate::config::AssistConfig;

/// Picks the completion model for a request.
///
/// Content that went through remote extraction gets the heavy profile;
/// everything else gets the light one.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    light: ModelProfile,
    heavy: ModelProfile,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::from_config(&AssistConfig::default())
    }
}

impl ModelSelector {
    /// Create a selector with explicit profiles.
    pub fn new(light: ModelProfile, heavy: ModelProfile) -> Self {
        Self { light, heavy }
    }

    /// Create a selector from the configured profiles.
    pub fn from_config(config: &AssistConfig) -> Self {
        Self::new(config.light_profile.clone(), config.heavy_profile.clone())
    }

    /// Select the profile for a request.
    ///
    /// Only remote ingestion decides; a text file read locally stays light.
    pub fn select(&self, _content_type: ContentType, used_remote_ingestion: bool) -> &ModelProfile {
        if used_remote_ingestion {
            &self.heavy
        } else {
            &self.light
        }
    }

    /// The light profile.
    pub fn light(&self) -> &ModelProfile {
        &self.light
    }

    /// The heavy profile.
    pub fn heavy(&self) -> &ModelProfile {
        &self.heavy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_ingestion_selects_heavy() {
        let selector = ModelSelector::default();

        let image = selector.select(ContentType::Image, true);
        let files = selector.select(ContentType::FilePaths, true);
        assert_eq!(image, files);
        assert_eq!(image.model_name, "kimi-k2-turbo-preview");
    }

    #[test]
    fn test_plain_text_selects_light() {
        let selector = ModelSelector::default();

        assert_eq!(
            selector.select(ContentType::Text, false).model_name,
            "moonshot-v1-8k"
        );
        assert_eq!(
            selector.select(ContentType::FilePaths, false),
            selector.light()
        );
    }

    #[test]
    fn test_custom_profiles() {
        let selector =
            ModelSelector::new(ModelProfile::new("small", 100), ModelProfile::new("big", 1000));

        assert_eq!(selector.select(ContentType::Text, false).model_name, "small");
        assert_eq!(selector.select(ContentType::Image, true).context_budget, 1000);
        assert_eq!(selector.heavy().model_name, "big");
    }
}

//! Pipeline configuration.

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use assist_core::ModelProfile;
use kimi_client::{KimiConfig, DEFAULT_API_URL};
use trigger_detector::DEFAULT_TRIGGER_WINDOW;

/// Default light model, used for plain text.
pub const DEFAULT_LIGHT_MODEL: &str = "moonshot-v1-8k";
/// Default light model context budget, in tokens.
pub const DEFAULT_LIGHT_CONTEXT: usize = 8 * 1024;
/// Default heavy model, used whenever remote extraction happened.
pub const DEFAULT_HEAVY_MODEL: &str = "kimi-k2-turbo-preview";
/// Default heavy model context budget, in tokens.
pub const DEFAULT_HEAVY_CONTEXT: usize = 256 * 1024;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default translation target language.
pub const DEFAULT_TRANSLATE_TARGET: &str = "Chinese";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Extensions read locally as UTF-8 text instead of being uploaded.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "log", "csv", "tsv", "json", "yaml", "yml", "toml", "ini",
    "cfg", "conf", "xml", "html", "htm", "css", "js", "ts", "jsx", "tsx", "py", "rs", "go",
    "java", "kt", "c", "h", "cpp", "hpp", "cc", "cs", "rb", "php", "swift", "m", "sh", "bash",
    "zsh", "sql", "lua", "r", "scala", "vue",
];

/// Configuration for the whole pipeline.
///
/// Built once and passed into the orchestrator; nothing reads the
/// environment mid-call.
#[derive(Debug, Clone)]
pub struct AssistConfig {
    /// API credential. `None` fails every execution with `ApiKeyMissing`.
    pub api_key: Option<String>,
    /// API base URL.
    pub api_url: String,
    /// Profile for plain text.
    pub light_profile: ModelProfile,
    /// Profile used whenever remote extraction happened.
    pub heavy_profile: ModelProfile,
    /// Sampling temperature for completions.
    pub temperature: f32,
    /// Trigger window (τ).
    pub trigger_window: Duration,
    /// Lowercase extensions (without dot) read locally as text.
    pub text_extensions: BTreeSet<String>,
    /// Target language for the translate action.
    pub translate_target: String,
    /// Delete uploaded files from the remote service after extraction.
    pub delete_remote_files: bool,
    /// HTTP timeout per request.
    pub request_timeout: Duration,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            light_profile: ModelProfile::new(DEFAULT_LIGHT_MODEL, DEFAULT_LIGHT_CONTEXT),
            heavy_profile: ModelProfile::new(DEFAULT_HEAVY_MODEL, DEFAULT_HEAVY_CONTEXT),
            temperature: DEFAULT_TEMPERATURE,
            trigger_window: DEFAULT_TRIGGER_WINDOW,
            text_extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            translate_target: DEFAULT_TRANSLATE_TARGET.to_string(),
            delete_remote_files: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AssistConfig {
    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KIMI_API_KEY` - API key (absent or empty fails at execute time)
    /// - `KIMI_API_URL` - API URL (default: https://api.moonshot.cn/v1)
    /// - `DOUBLETAP_LIGHT_MODEL` / `DOUBLETAP_LIGHT_CONTEXT` - Light profile
    /// - `DOUBLETAP_HEAVY_MODEL` / `DOUBLETAP_HEAVY_CONTEXT` - Heavy profile
    /// - `DOUBLETAP_TEMPERATURE` - Sampling temperature (default: 0.3)
    /// - `DOUBLETAP_TRIGGER_WINDOW_MS` - Trigger window (default: 800)
    /// - `DOUBLETAP_TEXT_EXTENSIONS` - Comma-separated text extensions
    /// - `DOUBLETAP_TRANSLATE_TARGET` - Translation target (default: Chinese)
    /// - `DOUBLETAP_DELETE_REMOTE_FILES` - Delete uploads (default: true)
    /// - `DOUBLETAP_REQUEST_TIMEOUT_SECS` - HTTP timeout (default: 60)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("KIMI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let light_profile = ModelProfile::new(
            env::var("DOUBLETAP_LIGHT_MODEL").unwrap_or(defaults.light_profile.model_name),
            parse_env("DOUBLETAP_LIGHT_CONTEXT").unwrap_or(defaults.light_profile.context_budget),
        );
        let heavy_profile = ModelProfile::new(
            env::var("DOUBLETAP_HEAVY_MODEL").unwrap_or(defaults.heavy_profile.model_name),
            parse_env("DOUBLETAP_HEAVY_CONTEXT").unwrap_or(defaults.heavy_profile.context_budget),
        );

        let text_extensions = env::var("DOUBLETAP_TEXT_EXTENSIONS")
            .ok()
            .map(|v| parse_extensions(&v))
            .filter(|set| !set.is_empty())
            .unwrap_or(defaults.text_extensions);

        let delete_remote_files = env::var("DOUBLETAP_DELETE_REMOTE_FILES")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.delete_remote_files);

        Self {
            api_key,
            api_url: env::var("KIMI_API_URL").unwrap_or(defaults.api_url),
            light_profile,
            heavy_profile,
            temperature: parse_env("DOUBLETAP_TEMPERATURE").unwrap_or(defaults.temperature),
            trigger_window: parse_env("DOUBLETAP_TRIGGER_WINDOW_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.trigger_window),
            text_extensions,
            translate_target: env::var("DOUBLETAP_TRANSLATE_TARGET")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.translate_target),
            delete_remote_files,
            request_timeout: parse_env("DOUBLETAP_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> AssistConfigBuilder {
        AssistConfigBuilder::default()
    }

    /// Whether a usable API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// Whether files with this extension are read locally as text.
    pub fn is_text_extension(&self, ext: &str) -> bool {
        self.text_extensions
            .contains(&ext.trim_start_matches('.').to_lowercase())
    }

    /// HTTP client configuration derived from this config.
    pub fn kimi_config(&self) -> KimiConfig {
        let mut builder = KimiConfig::builder()
            .api_url(self.api_url.clone())
            .timeout(self.request_timeout);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.clone());
        }
        builder.build()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_extensions(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Builder for AssistConfig.
#[derive(Debug, Default)]
pub struct AssistConfigBuilder {
    config: AssistConfig,
}

impl AssistConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the light profile.
    pub fn light_profile(mut self, profile: ModelProfile) -> Self {
        self.config.light_profile = profile;
        self
    }

    /// Set the heavy profile.
    pub fn heavy_profile(mut self, profile: ModelProfile) -> Self {
        self.config.heavy_profile = profile;
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = temp;
        self
    }

    /// Set the trigger window.
    pub fn trigger_window(mut self, window: Duration) -> Self {
        self.config.trigger_window = window;
        self
    }

    /// Replace the text extension allowlist.
    pub fn text_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.text_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Set the translation target language.
    pub fn translate_target(mut self, language: impl Into<String>) -> Self {
        self.config.translate_target = language.into();
        self
    }

    /// Set whether uploaded files are deleted after extraction.
    pub fn delete_remote_files(mut self, delete: bool) -> Self {
        self.config.delete_remote_files = delete;
        self
    }

    /// Set the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AssistConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "KIMI_API_KEY",
        "KIMI_API_URL",
        "DOUBLETAP_LIGHT_MODEL",
        "DOUBLETAP_LIGHT_CONTEXT",
        "DOUBLETAP_HEAVY_MODEL",
        "DOUBLETAP_HEAVY_CONTEXT",
        "DOUBLETAP_TEMPERATURE",
        "DOUBLETAP_TRIGGER_WINDOW_MS",
        "DOUBLETAP_TEXT_EXTENSIONS",
        "DOUBLETAP_TRANSLATE_TARGET",
        "DOUBLETAP_DELETE_REMOTE_FILES",
        "DOUBLETAP_REQUEST_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = AssistConfig::default();

        assert!(config.api_key.is_none());
        assert!(!config.has_api_key());
        assert_eq!(config.light_profile.model_name, "moonshot-v1-8k");
        assert_eq!(config.heavy_profile.model_name, "kimi-k2-turbo-preview");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.trigger_window, Duration::from_millis(800));
        assert!(config.delete_remote_files);
        assert!(config.is_text_extension("rs"));
        assert!(config.is_text_extension(".MD"));
        assert!(!config.is_text_extension("pdf"));
        assert!(!config.is_text_extension("png"));
    }

    #[test]
    fn test_builder() {
        let config = AssistConfig::builder()
            .api_key("sk-test")
            .light_profile(ModelProfile::new("small", 1000))
            .heavy_profile(ModelProfile::new("big", 9000))
            .temperature(0.1)
            .trigger_window(Duration::from_millis(500))
            .text_extensions([".TXT", "md"])
            .translate_target("English")
            .delete_remote_files(false)
            .build();

        assert!(config.has_api_key());
        assert_eq!(config.light_profile, ModelProfile::new("small", 1000));
        assert_eq!(config.heavy_profile.context_budget, 9000);
        assert_eq!(config.trigger_window, Duration::from_millis(500));
        assert!(config.is_text_extension("txt"));
        assert!(!config.is_text_extension("rs"));
        assert_eq!(config.translate_target, "English");
        assert!(!config.delete_remote_files);
    }

    #[test]
    fn test_blank_key_is_not_usable() {
        let config = AssistConfig::builder().api_key("   ").build();
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_kimi_config_derivation() {
        let config = AssistConfig::builder()
            .api_key("sk-test")
            .api_url("https://proxy.test/v1")
            .request_timeout(Duration::from_secs(5))
            .build();

        let kimi = config.kimi_config();
        assert_eq!(kimi.api_key.as_deref(), Some("sk-test"));
        assert_eq!(kimi.api_url, "https://proxy.test/v1");
        assert_eq!(kimi.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("KIMI_API_KEY", "sk-env");
        env::set_var("DOUBLETAP_HEAVY_MODEL", "kimi-latest");
        env::set_var("DOUBLETAP_LIGHT_CONTEXT", "4096");
        env::set_var("DOUBLETAP_TRIGGER_WINDOW_MS", "1200");
        env::set_var("DOUBLETAP_TEXT_EXTENSIONS", "txt, .Log ,,");
        env::set_var("DOUBLETAP_DELETE_REMOTE_FILES", "no");
        env::set_var("DOUBLETAP_TEMPERATURE", "not-a-number");

        let config = AssistConfig::from_env();
        clear_env();

        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.heavy_profile.model_name, "kimi-latest");
        assert_eq!(config.light_profile.context_budget, 4096);
        assert_eq!(config.trigger_window, Duration::from_millis(1200));
        assert_eq!(
            config.text_extensions.iter().collect::<Vec<_>>(),
            vec!["log", "txt"]
        );
        assert!(!config.delete_remote_files);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_from_env_empty_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("KIMI_API_KEY", "");
        let config = AssistConfig::from_env();
        clear_env();

        assert!(config.api_key.is_none());
        assert_eq!(config.translate_target, "Chinese");
    }
}

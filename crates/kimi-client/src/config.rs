//! Configuration for KimiClient.

use std::env;
use std::time::Duration;

/// Default Moonshot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.moonshot.cn/v1";

/// Default HTTP timeout for a single request.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for KimiClient.
#[derive(Debug, Clone)]
pub struct KimiConfig {
    /// API base URL (including the `/v1` segment).
    pub api_url: String,

    /// API key for authentication. `None` means no credential is configured.
    pub api_key: Option<String>,

    /// Timeout for each HTTP request.
    pub timeout: Duration,
}

impl Default for KimiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl KimiConfig {
    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KIMI_API_KEY` - API key (optional here; requests fail without it)
    /// - `KIMI_API_URL` - API URL (default: https://api.moonshot.cn/v1)
    /// - `DOUBLETAP_REQUEST_TIMEOUT_SECS` - Request timeout (default: 60)
    pub fn from_env() -> Self {
        let api_key = env::var("KIMI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let api_url = env::var("KIMI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = env::var("DOUBLETAP_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            api_url,
            api_key,
            timeout,
        }
    }

    /// Create a new config builder.
    pub fn builder() -> KimiConfigBuilder {
        KimiConfigBuilder::default()
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builder for KimiConfig.
#[derive(Debug, Default)]
pub struct KimiConfigBuilder {
    config: KimiConfig,
}

impl KimiConfigBuilder {
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

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> KimiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KimiConfig::default();

        assert_eq!(config.api_url, "https://api.moonshot.cn/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_all_options() {
        let config = KimiConfig::builder()
            .api_key("my-key")
            .api_url("https://custom.api.com/v1/")
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.api_key.as_deref(), Some("my-key"));
        assert_eq!(config.api_url, "https://custom.api.com/v1/");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_joining() {
        let config = KimiConfig::builder().api_url("https://x.test/v1/").build();
        assert_eq!(config.endpoint("/files"), "https://x.test/v1/files");
        assert_eq!(
            config.endpoint("chat/completions"),
            "https://x.test/v1/chat/completions"
        );
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_vars() {
            std::env::remove_var("KIMI_API_KEY");
            std::env::remove_var("KIMI_API_URL");
            std::env::remove_var("DOUBLETAP_REQUEST_TIMEOUT_SECS");
        }

        // Scenario 1: nothing set, defaults used and no key
        clear_all_vars();
        let config = KimiConfig::from_env();
        assert!(config.api_key.is_none());
        assert_eq!(config.api_url, DEFAULT_API_URL);

        // Scenario 2: blank key counts as missing
        clear_all_vars();
        std::env::set_var("KIMI_API_KEY", "   ");
        assert!(KimiConfig::from_env().api_key.is_none());

        // Scenario 3: all vars set
        clear_all_vars();
        std::env::set_var("KIMI_API_KEY", "env-key");
        std::env::set_var("KIMI_API_URL", "https://proxy.test/v1");
        std::env::set_var("DOUBLETAP_REQUEST_TIMEOUT_SECS", "12");
        let config = KimiConfig::from_env();
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.api_url, "https://proxy.test/v1");
        assert_eq!(config.timeout, Duration::from_secs(12));

        clear_all_vars();
    }
}

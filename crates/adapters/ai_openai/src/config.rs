//! Configuration of the `OpenAI`-compatible provider.

use std::time::Duration;

/// Public `OpenAI` endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Model used when an automation does not pick one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Upper bound of one completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API root, e.g. `https://api.openai.com/v1`; `/chat/completions` is appended.
    pub base_url: String,
    /// Bearer token. Empty means the provider is unavailable.
    pub api_key: String,
    /// Default model.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Full URL of the chat completions endpoint.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

//! AI provider port: text completions for agent prompts.

use std::future::Future;

use cronpilot_domain::automation::AgentSettings;
use cronpilot_domain::error::ProviderError;

/// Run-time policy for one completion; `None` means "provider default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl From<&AgentSettings> for CompletionOptions {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            model: settings.model.clone(),
            system_prompt: settings.system_prompt.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Text returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Model that actually answered, when reported.
    pub model: Option<String>,
}

/// An AI completion backend.
///
/// Timeouts are the provider's responsibility; callers never cancel a
/// completion once started.
pub trait AiProvider {
    /// Whether the provider can be called at all (e.g. credentials present).
    fn is_available(&self) -> bool {
        true
    }

    /// Complete `prompt` with the given options.
    fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> impl Future<Output = Result<Completion, ProviderError>> + Send;
}

//! [`AiProvider`] implementation over `reqwest`.

use reqwest::StatusCode;

use cronpilot_app::ports::{AiProvider, Completion, CompletionOptions};
use cronpilot_domain::error::ProviderError;

use crate::config::Config;
use crate::wire::{ChatMessage, ChatRequest, ChatResponse, ErrorBody};

/// Client for any `OpenAI`-compatible chat completions endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ProviderError::Request(err.to_string()))?;
        Ok(Self {
            client,
            url: config.completions_url(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
        })
    }

    fn request<'a>(&'a self, prompt: &'a str, options: &'a CompletionOptions) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        ChatRequest {
            model: options.model.as_deref().unwrap_or(&self.model),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = ErrorBody::message_of(body);
    if status == StatusCode::TOO_MANY_REQUESTS {
        let message = if message.is_empty() {
            "rate limited".to_string()
        } else {
            message
        };
        return ProviderError::RateLimited(message);
    }
    ProviderError::Status {
        status: status.as_u16(),
        body: message,
    }
}

impl AiProvider for OpenAiProvider {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError> {
        if !self.is_available() {
            return Err(ProviderError::Unavailable);
        }
        let body = self.request(prompt, options);
        tracing::debug!(url = %self.url, model = body.model, "requesting completion");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "completion request rejected");
            return Err(status_error(status, &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no completion choices".to_string()))?;

        Ok(Completion {
            text,
            model: parsed.model,
        })
    }
}

use async_trait::async_trait;
use rig::{completion::Prompt, providers::anthropic};
use tracing::{error, info};

use crate::definition::{CompletionBackend, CompletionRequest};
use crate::error::ProviderError;

/// Completion backend talking to the Anthropic Messages API through rig
pub struct AnthropicBackend {
    model: String,
    client: anthropic::Client,
}

impl AnthropicBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            model: model.to_string(),
            client: anthropic::ClientBuilder::new(api_key).build(),
        }
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&request.preamble)
            .max_tokens(request.max_tokens)
            .build();

        info!(model = %self.model, "Calling Anthropic API");

        let response = agent.prompt(request.prompt.clone()).await.map_err(|e| {
            error!(error = %e, model = %self.model, "Anthropic API call failed");
            classify_failure(&e.to_string())
        })?;

        Ok(response.trim().to_string())
    }
}

/// Maps a transport or API failure message onto the provider error kinds.
fn classify_failure(message: &str) -> ProviderError {
    let lower = message.to_lowercase();

    if ["authentication", "api key", "api_key", "401"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        ProviderError::Unauthorized
    } else if ["rate limit", "rate_limit", "429"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        ProviderError::RateLimit
    } else {
        ProviderError::Unavailable(message.to_string())
    }
}

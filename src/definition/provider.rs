use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::definition::{context, parser, prompt};
use crate::error::ProviderError;

/// Structured payload of one lookup, not yet saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionResult {
    pub definition: String,
    pub examples: Vec<String>,
    pub source_sentence: String,
}

/// One request to a text-generation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub preamble: String,
    pub prompt: String,
    pub max_tokens: u64,
}

/// Any text-generation service that turns a request into reply text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Turns a word and its surrounding text into a definition. Holds no state
/// between calls, so any backend honouring the JSON reply format will do.
#[derive(Clone)]
pub struct DefinitionProvider {
    backend: Arc<dyn CompletionBackend>,
    timeout: Duration,
    max_tokens: u64,
}

impl DefinitionProvider {
    pub fn new(backend: Arc<dyn CompletionBackend>, timeout: Duration, max_tokens: u64) -> Self {
        Self {
            backend,
            timeout,
            max_tokens,
        }
    }

    pub async fn define(
        &self,
        word: &str,
        context_text: &str,
    ) -> Result<DefinitionResult, ProviderError> {
        info!("Requesting definition for '{}'", word);

        let request = CompletionRequest {
            preamble: prompt::DEFINE_PREAMBLE.to_string(),
            prompt: prompt::define_prompt(word, context_text),
            max_tokens: self.max_tokens,
        };

        let reply = self.complete(&request).await?;
        let mut result = parser::parse_definition(&reply)?;
        result.source_sentence = resolve_source_sentence(word, context_text, &result.source_sentence);

        info!(
            "Defined '{}' with {} examples (source sentence {})",
            word,
            result.examples.len(),
            if result.source_sentence.is_empty() { "not found" } else { "found" }
        );
        Ok(result)
    }

    /// Asks for a different set of examples. Definition and source sentence
    /// of `current` are carried over untouched.
    pub async fn refresh_examples(
        &self,
        word: &str,
        context_text: &str,
        current: &DefinitionResult,
    ) -> Result<DefinitionResult, ProviderError> {
        info!("Requesting new examples for '{}'", word);

        let request = CompletionRequest {
            preamble: prompt::REFRESH_PREAMBLE.to_string(),
            prompt: prompt::refresh_prompt(
                word,
                &current.definition,
                context_text,
                &current.examples,
            ),
            max_tokens: self.max_tokens.min(512),
        };

        let reply = self.complete(&request).await?;
        let examples = parser::parse_examples(&reply)?;

        Ok(DefinitionResult {
            examples,
            ..current.clone()
        })
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        debug!("Prompt: {}", request.prompt);

        let reply = tokio::time::timeout(self.timeout, self.backend.complete(request))
            .await
            .map_err(|_| {
                warn!("Definition service timed out after {:?}", self.timeout);
                ProviderError::Timeout(self.timeout)
            })??;

        debug!("Response: {}", reply);
        Ok(reply)
    }
}

/// Keeps the model's sentence only if it is one whole sentence of the source
/// text that contains the word; otherwise falls back to the first source
/// sentence with the word.
pub fn resolve_source_sentence(word: &str, context_text: &str, proposed: &str) -> String {
    let proposed = proposed.trim();
    let word_lower = word.trim().to_lowercase();

    let accepted = !proposed.is_empty()
        && !word_lower.is_empty()
        && proposed.to_lowercase().contains(&word_lower)
        && context::sentences(context_text).contains(&proposed);

    if accepted {
        return proposed.to_string();
    }

    if !proposed.is_empty() {
        debug!(
            "Model sentence for '{}' is not a source sentence with the word, using local match",
            word
        );
    }

    context::find_sentence(word, context_text)
        .map(str::to_string)
        .unwrap_or_default()
}

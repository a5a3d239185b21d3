//! Gemini implementation of the provider trait.
//!
//! Wraps [`gemini_client::GeminiClient`] with the sentiment response schema
//! so the API itself constrains the document shape.

use async_trait::async_trait;
use gemini_client::{schema, GeminiClient, GeminiError, GenerationConfig};

use crate::error::{ProviderError, ProviderResult};
use crate::prompts::SentimentPrompt;
use crate::traits::SentimentProvider;

/// Sentiment provider backed by the Gemini `generateContent` API.
pub struct GeminiSentimentProvider {
    client: GeminiClient,
    generation: GenerationConfig,
}

impl GeminiSentimentProvider {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            generation: GenerationConfig::default()
                .with_json_schema(schema::sentiment_response_schema()),
        }
    }

    /// The model name analyses will be keyed under.
    pub fn model_name(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl SentimentProvider for GeminiSentimentProvider {
    async fn complete(&self, prompt: &SentimentPrompt) -> ProviderResult<String> {
        self.client
            .generate(
                &prompt.system_instruction,
                &prompt.user_message,
                &self.generation,
            )
            .await
            .map_err(|e| match e {
                GeminiError::Api { status: 429, .. } => ProviderError::RateLimited,
                GeminiError::Api { status, message } => ProviderError::Api { status, message },
                GeminiError::Network(message) => ProviderError::Transport(message),
                GeminiError::Parse(message) => ProviderError::Malformed(message),
                GeminiError::Config(message) => ProviderError::Transport(message),
            })
    }
}

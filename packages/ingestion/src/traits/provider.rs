//! Provider trait - the seam to the language-model completion service.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::prompts::SentimentPrompt;

/// Trait for language-model providers (to allow mocking).
///
/// Implementations wrap a specific provider (Gemini, OpenAI, ...) and are
/// expected to return the raw response text; parsing and repair happen in
/// the orchestrator.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Request a completion for one article's prompt.
    async fn complete(&self, prompt: &SentimentPrompt) -> ProviderResult<String>;
}

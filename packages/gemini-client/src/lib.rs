//! Pure REST client for the Google Gemini `generateContent` API.
//!
//! No pipeline knowledge lives here: callers supply the system instruction,
//! user text, and generation config, and get the raw response text back.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, GenerationConfig, schema};
//!
//! let client = GeminiClient::from_env()?;
//! let config = GenerationConfig::default()
//!     .with_json_schema(schema::sentiment_response_schema());
//! let text = client.generate("You are an analyst.", "Analyze this.", &config).await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

use tracing::debug;

/// Default model, matching the production analysis setup.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini REST API client.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the model (default: gemini-2.0-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a completion and return the raw response text.
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            system_instruction: Some(Content::system(system_instruction)),
            contents: vec![Content::user(user_text)],
            generation_config: config.clone(),
        };

        debug!(model = %self.model, user_chars = user_text.len(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        body.first_text()
            .ok_or_else(|| GeminiError::Parse("response contained no candidate text".to_string()))
    }
}

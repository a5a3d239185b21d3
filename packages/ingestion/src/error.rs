//! Typed errors for the ingestion pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. The taxonomy mirrors the
//! recovery policy: fetch and validation errors skip one item, provider
//! errors are retried a bounded number of times, store conflicts are
//! success-no-ops, and only configuration problems are fatal.

use thiserror::Error;

/// Top-level pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Listing or article page unreachable
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Language-model provider call failed or returned unparseable text
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Extracted record is missing a required field
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Raw sentiment result could not be decomposed
    #[error("decomposition failed: {0}")]
    Decompose(#[from] DecomposeError),

    /// No prompt template registered for a media id
    #[error("no prompt template registered for media {media_id}")]
    UnsupportedMedia { media_id: i32 },

    /// Configuration error detected at startup
    #[error("config error: {0}")]
    Config(String),
}

/// Errors fetching listing or article pages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    /// Connection timeout
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors from the language-model provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider rejected the request
    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Provider rate limit hit
    #[error("provider rate limit exceeded")]
    RateLimited,

    /// Provider returned text that cannot be parsed even after repair
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Errors from the article store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Duplicate key on insert; callers treat this as success-no-op
    #[error("duplicate key: {key}")]
    Conflict { key: String },

    /// Row expected to exist was not found
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Validation errors for extracted article records.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Article has no discoverable publication timestamp
    #[error("article at {url} has no publication timestamp")]
    MissingTimestamp { url: String },

    /// Article body is empty after normalization
    #[error("article at {url} has an empty body")]
    EmptyBody { url: String },

    /// Article has no source-assigned identifier
    #[error("article at {url} has no source article id")]
    MissingSourceId { url: String },
}

/// Errors decomposing a raw sentiment result.
#[derive(Debug, Error)]
pub enum DecomposeError {
    /// Required document structure is missing or ill-typed
    #[error("malformed sentiment document: {reason}")]
    MalformedDocument { reason: String },

    /// Storage failed while persisting decomposed rows
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

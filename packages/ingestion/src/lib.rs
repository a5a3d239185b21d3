//! Incremental Article Ingestion and Sentiment Analysis Pipeline
//!
//! Discovers news articles across paginated listings, normalizes and stores
//! them exactly once, and enriches each with structured sentiment scores
//! from a language-model provider.
//!
//! # Design
//!
//! Both halves of the pipeline share one engineering problem: acquiring
//! data from an unreliable external source exactly once per logical item,
//! with partial-failure recovery.
//!
//! - The **crawl frontier** walks one source's listing pages sequentially,
//!   deduplicates against the store, and advances a date cursor when
//!   pagination is exhausted.
//! - The **sentiment analyzer** guarantees at most one raw result per
//!   `(article, model)` pair, with bounded retry and trailing-comma repair
//!   of near-valid provider JSON.
//! - The **decomposer** expands raw results into normalized score rows and
//!   is safely re-runnable.
//!
//! External collaborators (store, fetcher, provider) are injected as trait
//! handles; connection lifecycle belongs to the process entry point.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ingestion::{CrawlFrontier, MemoryStore, SentimentAnalyzer, sources};
//!
//! let store = MemoryStore::new();
//! let frontier = CrawlFrontier::new(&source_config, &fetcher, &store);
//! let outcome = frontier.run().await?;
//!
//! let analyzer = SentimentAnalyzer::new(&store, &provider, "gemini-2.0-flash",
//!     sources::seed_prompt_catalog());
//! let articles = store.list_articles_for_analysis(media_id, false).await?;
//! analyzer.analyze_backlog(&articles).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (store, fetcher, provider)
//! - [`types`] - Domain types
//! - [`frontier`] - Crawl state machine
//! - [`analyzer`] - Sentiment orchestrator
//! - [`decompose`] - Raw-result decomposition
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Mock implementations for testing

pub mod analyzer;
pub mod decompose;
pub mod error;
pub mod frontier;
pub mod normalize;
pub mod prompts;
pub mod repair;
pub mod retry;
pub mod sources;
pub mod stats;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "gemini")]
pub mod providers;

// Re-export core types at crate root
pub use error::{
    DecomposeError, FetchError, PipelineError, ProviderError, StoreError, ValidationError,
};
pub use traits::{
    fetcher::{ArticleFetcher, ListingPage},
    provider::SentimentProvider,
    store::{ArticleStore, DecomposeSummary},
};
pub use types::{
    Article, ArticleRecord, ArticleScores, EditorTenure, EntityAnalysis, EntityKind, EntityScore,
    Media, NewArticle, NewSentimentAnalysis, SentimentAnalysis, SourceConfig,
};

// Re-export pipeline components
pub use analyzer::{BacklogOutcome, SentimentAnalyzer};
pub use decompose::decompose;
pub use frontier::{CrawlFrontier, CrawlOutcome, StopReason};
pub use normalize::{clean_text, normalize_record};
pub use prompts::{PromptCatalog, PromptTemplate, SentimentPrompt};
pub use repair::parse_sentiment_json;
pub use retry::{with_retry, RetryPolicy};
pub use stats::{parse_score, score_distribution, ScoreDistribution};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

#[cfg(feature = "gemini")]
pub use providers::GeminiSentimentProvider;

// Re-export testing utilities
pub use testing::{MockFetcher, MockProvider};

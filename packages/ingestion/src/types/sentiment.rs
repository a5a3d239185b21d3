//! Sentiment analysis types - raw provider results and decomposed rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw sentiment result to persist for an `(article_id, model_name)` pair.
#[derive(Debug, Clone)]
pub struct NewSentimentAnalysis {
    pub article_id: i64,
    pub model_name: String,
    pub raw_result: serde_json::Value,
}

/// A stored raw sentiment result.
///
/// Unique on `(article_id, model_name)` - this is the idempotency key for
/// the whole analysis stage. `raw_result` is kept exactly as the provider
/// produced it (after JSON repair); all derived rows are recomputed from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub id: i64,
    pub article_id: i64,
    pub model_name: String,
    pub raw_result: serde_json::Value,
    pub analyzed_at: DateTime<Utc>,
}

/// Article-level objectivity scores derived from one raw result.
///
/// One row per `sentiment_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleScores {
    pub sentiment_id: i64,
    pub title_score: i32,
    pub title_explanation: String,
    pub body_score: i32,
    pub body_explanation: String,
}

/// Which entity table a decomposed score row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Party,
    Politician,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Party => "party",
            EntityKind::Politician => "politician",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named entity's score as parsed out of a raw result.
///
/// The score is kept as raw text exactly as the provider produced it;
/// range validation happens at aggregation time (see [`crate::stats`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityScore {
    pub name: String,
    pub score: String,
    pub explanation: String,
}

impl EntityScore {
    pub fn new(
        name: impl Into<String>,
        score: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            score: score.into(),
            explanation: explanation.into(),
        }
    }
}

/// A stored per-entity score row.
///
/// Unique on `(sentiment_id, name)` within its kind's table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAnalysis {
    pub sentiment_id: i64,
    pub name: String,
    pub score: String,
    pub explanation: String,
}

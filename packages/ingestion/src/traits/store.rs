//! Storage trait for articles, raw sentiment results, and decomposed rows.
//!
//! All writes are upserts guarded by the schema's uniqueness constraints,
//! which makes every pipeline stage safe to re-run over an already-processed
//! backlog. The store handle is injected into each component; connection
//! lifecycle is owned by the process entry point.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    Article, ArticleScores, EditorTenure, EntityAnalysis, EntityKind, EntityScore, Media,
    NewArticle, NewSentimentAnalysis, SentimentAnalysis,
};

/// Counters from one decomposition apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecomposeSummary {
    /// Whether the article-analysis row was inserted (false: already present)
    pub article_inserted: bool,
    /// Entity rows inserted
    pub entities_inserted: usize,
    /// Entity rows left untouched because `(sentiment_id, name)` existed
    pub entities_existing: usize,
}

/// Transactional store for the ingestion pipeline.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    // Articles

    /// Check whether an article with this URL is already stored.
    async fn article_exists(&self, url: &str) -> StoreResult<bool>;

    /// Look up an article by its natural key.
    async fn get_article(
        &self,
        source_article_id: i64,
        media_id: i32,
    ) -> StoreResult<Option<Article>>;

    /// Insert an article, or refresh `url` and `body` if the
    /// `(source_article_id, media_id)` key already exists.
    async fn upsert_article(&self, article: &NewArticle) -> StoreResult<Article>;

    /// The analysis work queue: a media's articles, newest first,
    /// optionally excluding paywalled ones.
    async fn list_articles_for_analysis(
        &self,
        media_id: i32,
        include_paywalled: bool,
    ) -> StoreResult<Vec<Article>>;

    // Raw sentiment results

    /// Look up the raw result for `(article_id, model_name)`.
    async fn get_analysis(
        &self,
        article_id: i64,
        model_name: &str,
    ) -> StoreResult<Option<SentimentAnalysis>>;

    /// Insert a raw result.
    ///
    /// Fails with [`StoreError::Conflict`](crate::error::StoreError::Conflict)
    /// when a row for `(article_id, model_name)` already exists; it never
    /// silently overwrites.
    async fn insert_analysis(
        &self,
        analysis: &NewSentimentAnalysis,
    ) -> StoreResult<SentimentAnalysis>;

    /// Replace the raw result of an existing analysis (malformed-result
    /// rewrite path).
    async fn replace_analysis(
        &self,
        id: i64,
        raw_result: serde_json::Value,
    ) -> StoreResult<SentimentAnalysis>;

    // Decomposed rows

    /// Insert the article-level scores unless a row for this `sentiment_id`
    /// exists. Returns whether a row was inserted.
    async fn upsert_article_analysis(&self, scores: &ArticleScores) -> StoreResult<bool>;

    /// Insert one entity score row unless `(sentiment_id, name)` exists
    /// (first write wins). Returns whether a row was inserted.
    async fn upsert_entity_analysis(
        &self,
        kind: EntityKind,
        sentiment_id: i64,
        name: &str,
        score: &str,
        explanation: &str,
    ) -> StoreResult<bool>;

    /// Apply one full decomposition.
    ///
    /// The default implementation chains the granular upserts; stores with
    /// real transactions override it so readers never observe a half-written
    /// decomposition.
    async fn apply_decomposition(
        &self,
        sentiment_id: i64,
        scores: &ArticleScores,
        parties: &[EntityScore],
        politicians: &[EntityScore],
    ) -> StoreResult<DecomposeSummary> {
        let mut summary = DecomposeSummary {
            article_inserted: self.upsert_article_analysis(scores).await?,
            ..Default::default()
        };

        for (kind, entries) in [
            (EntityKind::Party, parties),
            (EntityKind::Politician, politicians),
        ] {
            for entry in entries {
                let inserted = self
                    .upsert_entity_analysis(
                        kind,
                        sentiment_id,
                        &entry.name,
                        &entry.score,
                        &entry.explanation,
                    )
                    .await?;
                if inserted {
                    summary.entities_inserted += 1;
                } else {
                    summary.entities_existing += 1;
                }
            }
        }

        Ok(summary)
    }

    /// All entity rows of one kind for a media (aggregation input).
    async fn list_entity_analyses(
        &self,
        kind: EntityKind,
        media_id: i32,
    ) -> StoreResult<Vec<EntityAnalysis>>;

    // Media (seed path)

    /// Insert or update a media source and its chief-editor history.
    async fn upsert_media(&self, media: &Media, editors: &[EditorTenure]) -> StoreResult<()>;

    /// Look up a media source by id.
    async fn get_media(&self, media_id: i32) -> StoreResult<Option<Media>>;
}

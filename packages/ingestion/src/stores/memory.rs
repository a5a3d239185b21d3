//! In-memory storage implementation for testing and development.
//!
//! Enforces the same uniqueness constraints as the Postgres store
//! (article natural key, one analysis per `(article_id, model_name)`,
//! first-write-wins entity rows) so pipeline semantics can be tested
//! without a database. A single lock guards all state, which also makes
//! `apply_decomposition` atomic.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ArticleStore, DecomposeSummary};
use crate::types::{
    Article, ArticleScores, EditorTenure, EntityAnalysis, EntityKind, EntityScore, Media,
    NewArticle, NewSentimentAnalysis, SentimentAnalysis,
};

#[derive(Default)]
struct Inner {
    media: HashMap<i32, (Media, Vec<EditorTenure>)>,
    articles: HashMap<i64, Article>,
    analyses: HashMap<i64, SentimentAnalysis>,
    article_analyses: HashMap<i64, ArticleScores>,
    entity_analyses: HashMap<(EntityKind, i64, String), EntityAnalysis>,
    next_article_id: i64,
    next_analysis_id: i64,
}

/// In-memory store. Data is lost on drop; not for production.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored articles.
    pub fn article_count(&self) -> usize {
        self.inner.read().unwrap().articles.len()
    }

    /// Number of stored raw analyses.
    pub fn analysis_count(&self) -> usize {
        self.inner.read().unwrap().analyses.len()
    }

    /// Number of stored entity rows across both kinds.
    pub fn entity_count(&self) -> usize {
        self.inner.read().unwrap().entity_analyses.len()
    }

    /// Fetch the article-analysis row for a sentiment id.
    pub fn article_analysis(&self, sentiment_id: i64) -> Option<ArticleScores> {
        self.inner
            .read()
            .unwrap()
            .article_analyses
            .get(&sentiment_id)
            .cloned()
    }

    /// Fetch one entity row.
    pub fn entity_analysis(
        &self,
        kind: EntityKind,
        sentiment_id: i64,
        name: &str,
    ) -> Option<EntityAnalysis> {
        self.inner
            .read()
            .unwrap()
            .entity_analyses
            .get(&(kind, sentiment_id, name.to_string()))
            .cloned()
    }
}

impl Inner {
    fn upsert_article_row(&mut self, article: &NewArticle) -> Article {
        let existing = self
            .articles
            .values()
            .find(|a| {
                a.source_article_id == article.source_article_id && a.media_id == article.media_id
            })
            .map(|a| a.id);

        match existing {
            Some(id) => {
                // Re-crawl refreshes url and body only
                let row = self.articles.get_mut(&id).unwrap();
                row.url = article.url.clone();
                row.body = article.body.clone();
                row.clone()
            }
            None => {
                self.next_article_id += 1;
                let row = Article::from_new(self.next_article_id, article.clone());
                self.articles.insert(row.id, row.clone());
                row
            }
        }
    }

    fn upsert_article_analysis_row(&mut self, scores: &ArticleScores) -> bool {
        if self.article_analyses.contains_key(&scores.sentiment_id) {
            return false;
        }
        self.article_analyses
            .insert(scores.sentiment_id, scores.clone());
        true
    }

    fn upsert_entity_row(
        &mut self,
        kind: EntityKind,
        sentiment_id: i64,
        name: &str,
        score: &str,
        explanation: &str,
    ) -> bool {
        let key = (kind, sentiment_id, name.to_string());
        if self.entity_analyses.contains_key(&key) {
            return false;
        }
        self.entity_analyses.insert(
            key,
            EntityAnalysis {
                sentiment_id,
                name: name.to_string(),
                score: score.to_string(),
                explanation: explanation.to_string(),
            },
        );
        true
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn article_exists(&self, url: &str) -> StoreResult<bool> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .articles
            .values()
            .any(|a| a.url == url))
    }

    async fn get_article(
        &self,
        source_article_id: i64,
        media_id: i32,
    ) -> StoreResult<Option<Article>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .articles
            .values()
            .find(|a| a.source_article_id == source_article_id && a.media_id == media_id)
            .cloned())
    }

    async fn upsert_article(&self, article: &NewArticle) -> StoreResult<Article> {
        Ok(self.inner.write().unwrap().upsert_article_row(article))
    }

    async fn list_articles_for_analysis(
        &self,
        media_id: i32,
        include_paywalled: bool,
    ) -> StoreResult<Vec<Article>> {
        let mut articles: Vec<Article> = self
            .inner
            .read()
            .unwrap()
            .articles
            .values()
            .filter(|a| a.media_id == media_id && (include_paywalled || !a.paywall))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(articles)
    }

    async fn get_analysis(
        &self,
        article_id: i64,
        model_name: &str,
    ) -> StoreResult<Option<SentimentAnalysis>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .analyses
            .values()
            .find(|a| a.article_id == article_id && a.model_name == model_name)
            .cloned())
    }

    async fn insert_analysis(
        &self,
        analysis: &NewSentimentAnalysis,
    ) -> StoreResult<SentimentAnalysis> {
        let mut inner = self.inner.write().unwrap();

        let duplicate = inner.analyses.values().any(|a| {
            a.article_id == analysis.article_id && a.model_name == analysis.model_name
        });
        if duplicate {
            return Err(StoreError::Conflict {
                key: format!("({}, {})", analysis.article_id, analysis.model_name),
            });
        }

        inner.next_analysis_id += 1;
        let row = SentimentAnalysis {
            id: inner.next_analysis_id,
            article_id: analysis.article_id,
            model_name: analysis.model_name.clone(),
            raw_result: analysis.raw_result.clone(),
            analyzed_at: Utc::now(),
        };
        inner.analyses.insert(row.id, row.clone());
        Ok(row)
    }

    async fn replace_analysis(
        &self,
        id: i64,
        raw_result: serde_json::Value,
    ) -> StoreResult<SentimentAnalysis> {
        let mut inner = self.inner.write().unwrap();
        let row = inner
            .analyses
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound {
                what: format!("sentiment analysis {id}"),
            })?;
        row.raw_result = raw_result;
        row.analyzed_at = Utc::now();
        Ok(row.clone())
    }

    async fn upsert_article_analysis(&self, scores: &ArticleScores) -> StoreResult<bool> {
        Ok(self
            .inner
            .write()
            .unwrap()
            .upsert_article_analysis_row(scores))
    }

    async fn upsert_entity_analysis(
        &self,
        kind: EntityKind,
        sentiment_id: i64,
        name: &str,
        score: &str,
        explanation: &str,
    ) -> StoreResult<bool> {
        Ok(self
            .inner
            .write()
            .unwrap()
            .upsert_entity_row(kind, sentiment_id, name, score, explanation))
    }

    async fn apply_decomposition(
        &self,
        sentiment_id: i64,
        scores: &ArticleScores,
        parties: &[EntityScore],
        politicians: &[EntityScore],
    ) -> StoreResult<DecomposeSummary> {
        // One write guard across the whole apply keeps it atomic
        let mut inner = self.inner.write().unwrap();
        let mut summary = DecomposeSummary {
            article_inserted: inner.upsert_article_analysis_row(scores),
            ..Default::default()
        };

        for (kind, entries) in [
            (EntityKind::Party, parties),
            (EntityKind::Politician, politicians),
        ] {
            for entry in entries {
                if inner.upsert_entity_row(
                    kind,
                    sentiment_id,
                    &entry.name,
                    &entry.score,
                    &entry.explanation,
                ) {
                    summary.entities_inserted += 1;
                } else {
                    summary.entities_existing += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn list_entity_analyses(
        &self,
        kind: EntityKind,
        media_id: i32,
    ) -> StoreResult<Vec<EntityAnalysis>> {
        let inner = self.inner.read().unwrap();

        let mut rows: Vec<EntityAnalysis> = inner
            .entity_analyses
            .iter()
            .filter(|((row_kind, sentiment_id, _), _)| {
                *row_kind == kind
                    && inner
                        .analyses
                        .get(sentiment_id)
                        .and_then(|analysis| inner.articles.get(&analysis.article_id))
                        .map(|article| article.media_id == media_id)
                        .unwrap_or(false)
            })
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by(|a, b| (a.sentiment_id, &a.name).cmp(&(b.sentiment_id, &b.name)));
        Ok(rows)
    }

    async fn upsert_media(&self, media: &Media, editors: &[EditorTenure]) -> StoreResult<()> {
        self.inner
            .write()
            .unwrap()
            .media
            .insert(media.id, (media.clone(), editors.to_vec()));
        Ok(())
    }

    async fn get_media(&self, media_id: i32) -> StoreResult<Option<Media>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .media
            .get(&media_id)
            .map(|(media, _)| media.clone()))
    }
}

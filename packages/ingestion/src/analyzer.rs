//! Sentiment orchestrator - one raw result per article per model.
//!
//! Guarantees each article accumulates at most one sentiment result per
//! model, acquired with bounded retry, with persistence idempotent under
//! crash/restart. Checkpointing is per-article: an external stop between
//! articles never loses completed work.

use tracing::{debug, info, warn};

use crate::decompose::decompose;
use crate::error::{DecomposeError, PipelineError, ProviderResult, Result, StoreError};
use crate::prompts::{PromptCatalog, SentimentPrompt};
use crate::repair::parse_sentiment_json;
use crate::retry::{with_retry, RetryPolicy};
use crate::traits::{ArticleStore, SentimentProvider};
use crate::types::{Article, NewSentimentAnalysis, SentimentAnalysis};

/// Counters from one backlog run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacklogOutcome {
    /// Articles whose raw result was decomposed successfully
    pub decomposed: usize,
    /// Articles skipped because the provider gave up after retries
    pub skipped: usize,
    /// Raw results rewritten once after a structural decompose failure
    pub rewritten: usize,
    /// Articles that failed even after the rewrite cycle
    pub failed: usize,
}

/// Orchestrates provider calls and idempotent persistence for one model.
pub struct SentimentAnalyzer<'a, S, P> {
    store: &'a S,
    provider: &'a P,
    model_name: String,
    catalog: PromptCatalog,
    retry: RetryPolicy,
}

impl<'a, S, P> SentimentAnalyzer<'a, S, P>
where
    S: ArticleStore,
    P: SentimentProvider,
{
    pub fn new(
        store: &'a S,
        provider: &'a P,
        model_name: impl Into<String>,
        catalog: PromptCatalog,
    ) -> Self {
        Self {
            store,
            provider,
            model_name: model_name.into(),
            catalog,
            retry: RetryPolicy::provider_default(),
        }
    }

    /// Override the provider retry policy (tests use a zero delay).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Ensure one raw sentiment result exists for this article and model.
    ///
    /// Returns the existing row unchanged when one is already stored; calls
    /// the provider otherwise. Retry exhaustion yields `Ok(None)` - the
    /// article is skipped for this pass, nothing partial is written.
    pub async fn analyze_article(&self, article: &Article) -> Result<Option<SentimentAnalysis>> {
        if let Some(existing) = self
            .store
            .get_analysis(article.id, &self.model_name)
            .await?
        {
            debug!(
                article_id = article.id,
                model = %self.model_name,
                "analysis already stored, skipping request"
            );
            return Ok(Some(existing));
        }

        // Missing prompt templates are a configuration problem and fatal.
        let prompt = self
            .catalog
            .build_prompt(article.media_id, &article.title, &article.body)?;

        info!(
            article_id = article.id,
            title = %article.title,
            model = %self.model_name,
            "requesting sentiment analysis"
        );
        let raw_result = match self.request_sentiment(&prompt).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    article_id = article.id,
                    error = %e,
                    "provider attempts exhausted, skipping article this pass"
                );
                return Ok(None);
            }
        };

        let analysis = self
            .persist_analysis(article.id, raw_result)
            .await?;
        Ok(Some(analysis))
    }

    /// Analyze and decompose a backlog of articles sequentially.
    ///
    /// A structural decomposition failure triggers exactly one
    /// re-request-and-rewrite cycle for that article; any other per-article
    /// failure is logged and the backlog continues.
    pub async fn analyze_backlog(&self, articles: &[Article]) -> Result<BacklogOutcome> {
        info!(
            articles = articles.len(),
            model = %self.model_name,
            "analyzing backlog"
        );
        let mut outcome = BacklogOutcome::default();

        for article in articles {
            let analysis = match self.analyze_article(article).await {
                Ok(Some(analysis)) => analysis,
                Ok(None) => {
                    outcome.skipped += 1;
                    continue;
                }
                Err(e @ PipelineError::UnsupportedMedia { .. }) => return Err(e),
                Err(e @ PipelineError::Config(_)) => return Err(e),
                Err(e) => {
                    warn!(article_id = article.id, error = %e, "analysis failed");
                    outcome.failed += 1;
                    continue;
                }
            };

            match decompose(self.store, &analysis).await {
                Ok(_) => outcome.decomposed += 1,
                Err(DecomposeError::MalformedDocument { reason }) => {
                    warn!(
                        article_id = article.id,
                        sentiment_id = analysis.id,
                        reason = %reason,
                        "stored result is malformed, requesting a fresh one"
                    );
                    match self.rewrite_analysis(article, analysis.id).await {
                        Ok(rewritten) => match decompose(self.store, &rewritten).await {
                            Ok(_) => {
                                outcome.rewritten += 1;
                                outcome.decomposed += 1;
                            }
                            Err(e) => {
                                warn!(
                                    article_id = article.id,
                                    error = %e,
                                    "rewritten result still fails to decompose"
                                );
                                outcome.failed += 1;
                            }
                        },
                        Err(e) => {
                            warn!(
                                article_id = article.id,
                                error = %e,
                                "could not rewrite sentiment analysis"
                            );
                            outcome.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(article_id = article.id, error = %e, "decomposition failed");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            decomposed = outcome.decomposed,
            skipped = outcome.skipped,
            rewritten = outcome.rewritten,
            failed = outcome.failed,
            "backlog finished"
        );
        Ok(outcome)
    }

    /// Call the provider with bounded retry; an unparseable response counts
    /// as a failed attempt.
    async fn request_sentiment(&self, prompt: &SentimentPrompt) -> ProviderResult<serde_json::Value> {
        with_retry(self.retry, "sentiment request", || async move {
            let response = self.provider.complete(prompt).await?;
            parse_sentiment_json(&response)
        })
        .await
    }

    /// Insert the raw result; a concurrent duplicate insert is resolved by
    /// returning the row that won.
    async fn persist_analysis(
        &self,
        article_id: i64,
        raw_result: serde_json::Value,
    ) -> Result<SentimentAnalysis> {
        let new = NewSentimentAnalysis {
            article_id,
            model_name: self.model_name.clone(),
            raw_result,
        };

        match self.store.insert_analysis(&new).await {
            Ok(analysis) => Ok(analysis),
            Err(StoreError::Conflict { key }) => {
                debug!(article_id, key = %key, "concurrent insert lost, reading winner");
                self.store
                    .get_analysis(article_id, &self.model_name)
                    .await?
                    .ok_or_else(|| {
                        PipelineError::Store(StoreError::NotFound {
                            what: format!("analysis for article {article_id}"),
                        })
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Re-request the provider once and replace the stored raw result.
    async fn rewrite_analysis(
        &self,
        article: &Article,
        analysis_id: i64,
    ) -> Result<SentimentAnalysis> {
        let prompt = self
            .catalog
            .build_prompt(article.media_id, &article.title, &article.body)?;
        let raw_result = self.request_sentiment(&prompt).await?;
        Ok(self.store.replace_analysis(analysis_id, raw_result).await?)
    }
}

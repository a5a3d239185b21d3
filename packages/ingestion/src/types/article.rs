//! Article types - raw fetched records and stored articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw article record as extracted from an article page, before
/// normalization and validation.
///
/// Produced by an [`ArticleFetcher`](crate::traits::fetcher::ArticleFetcher)
/// implementation. Field extraction mechanics (selectors etc.) are the
/// fetcher's concern; the pipeline only consumes this record.
#[derive(Debug, Clone, Default)]
pub struct ArticleRecord {
    /// Article identifier assigned by the originating site
    pub source_article_id: Option<i64>,

    /// Canonical URL of the article page
    pub url: String,

    /// Headline as found on the page
    pub title: Option<String>,

    /// Publication timestamp as found on the page
    pub published_at: Option<DateTime<Utc>>,

    /// Byline, if present
    pub authors: Option<String>,

    /// Whether the article sits behind a paywall
    pub paywall: bool,

    /// Section/category label
    pub category: Option<String>,

    /// Preview image URL
    pub preview_url: Option<String>,

    /// Body text paragraphs, in document order
    pub paragraphs: Vec<String>,
}

impl ArticleRecord {
    /// Create a record for a URL; remaining fields are filled by the fetcher.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// A normalized article ready for storage.
///
/// Invariants enforced by [`normalize_record`](crate::normalize::normalize_record):
/// non-empty body, present publication timestamp, present source article id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArticle {
    pub source_article_id: i64,
    pub media_id: i32,
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub authors: Option<String>,
    pub paywall: bool,
    pub category: Option<String>,
    pub preview_url: Option<String>,
    pub body: String,
}

/// A stored article with its surrogate key.
///
/// Unique on `(source_article_id, media_id)`. Re-crawling a known article
/// refreshes `url` and `body` only; articles are never deleted by the
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub source_article_id: i64,
    pub media_id: i32,
    pub url: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub authors: Option<String>,
    pub paywall: bool,
    pub category: Option<String>,
    pub preview_url: Option<String>,
    pub body: String,
}

impl Article {
    /// Attach a surrogate key to a normalized article.
    pub fn from_new(id: i64, new: NewArticle) -> Self {
        Self {
            id,
            source_article_id: new.source_article_id,
            media_id: new.media_id,
            url: new.url,
            title: new.title,
            published_at: new.published_at,
            authors: new.authors,
            paywall: new.paywall,
            category: new.category,
            preview_url: new.preview_url,
            body: new.body,
        }
    }
}

//! Fetcher trait - the seam between the crawl frontier and page retrieval.
//!
//! Link discovery and article field extraction (selector mechanics) live
//! behind this trait; the frontier only consumes well-defined records.

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::ArticleRecord;

/// One fetched listing page.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Candidate article URLs found on the page, in page order.
    /// May be absolute or relative to the listing URL.
    pub article_links: Vec<String>,

    /// The next-page link located by the source's configured locator,
    /// or `None` when pagination is exhausted.
    pub next_page: Option<String>,
}

impl ListingPage {
    pub fn new<I, S>(article_links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            article_links: article_links.into_iter().map(|s| s.into()).collect(),
            next_page: None,
        }
    }

    pub fn with_next_page(mut self, next_page: impl Into<String>) -> Self {
        self.next_page = Some(next_page.into());
        self
    }
}

/// Trait for fetching listing pages and article records (to allow mocking).
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Fetch one listing page and extract its article links and next-page
    /// link.
    async fn fetch_listing(&self, url: &str) -> FetchResult<ListingPage>;

    /// Fetch one article page and extract its fields.
    async fn fetch_article(&self, url: &str) -> FetchResult<ArticleRecord>;
}

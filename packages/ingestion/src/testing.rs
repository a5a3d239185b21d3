//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline without
//! making real provider or network calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult, ProviderError, ProviderResult};
use crate::prompts::SentimentPrompt;
use crate::traits::{ArticleFetcher, ListingPage, SentimentProvider};
use crate::types::ArticleRecord;

/// One scripted provider reply.
enum ScriptedReply {
    Response(String),
    Failure,
}

/// A mock sentiment provider replaying scripted responses in order.
///
/// With no script and `always_fail`, every call fails; a drained script
/// also fails, which keeps runaway loops visible in tests.
#[derive(Default)]
pub struct MockProvider {
    script: Mutex<Vec<ScriptedReply>>,
    always_fail: bool,
    calls: Arc<Mutex<u32>>,
    prompts: Arc<Mutex<Vec<SentimentPrompt>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push(ScriptedReply::Response(response.into()));
        self
    }

    /// Queue one transport failure.
    pub fn with_failure(self) -> Self {
        self.script.lock().unwrap().push(ScriptedReply::Failure);
        self
    }

    /// Fail every call regardless of the script.
    pub fn always_fail(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// Number of `complete` calls made.
    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<SentimentPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SentimentProvider for MockProvider {
    async fn complete(&self, prompt: &SentimentPrompt) -> ProviderResult<String> {
        *self.calls.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.clone());

        if self.always_fail {
            return Err(ProviderError::Transport("mock provider failure".into()));
        }

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Err(ProviderError::Transport(
                "mock provider script exhausted".into(),
            ));
        }
        match script.remove(0) {
            ScriptedReply::Response(response) => Ok(response),
            ScriptedReply::Failure => {
                Err(ProviderError::Transport("mock provider failure".into()))
            }
        }
    }
}

/// A mock article fetcher serving predefined listings and records.
///
/// Unknown listing URLs resolve to the default listing when one is set and
/// to an empty, next-page-less listing otherwise; unknown article URLs
/// fail.
#[derive(Default)]
pub struct MockFetcher {
    listings: RwLock<HashMap<String, ListingPage>>,
    default_listing: RwLock<Option<ListingPage>>,
    articles: RwLock<HashMap<String, ArticleRecord>>,
    fail_articles: RwLock<HashSet<String>>,
    fail_listings: RwLock<HashSet<String>>,
    listing_fetches: Arc<Mutex<Vec<String>>>,
    article_fetches: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a listing page for an exact URL.
    pub fn with_listing(self, url: impl Into<String>, page: ListingPage) -> Self {
        self.listings.write().unwrap().insert(url.into(), page);
        self
    }

    /// Serve a listing page for any URL without an exact match.
    pub fn with_default_listing(self, page: ListingPage) -> Self {
        *self.default_listing.write().unwrap() = Some(page);
        self
    }

    /// Serve an article record for a URL.
    pub fn with_article(self, url: impl Into<String>, record: ArticleRecord) -> Self {
        self.articles.write().unwrap().insert(url.into(), record);
        self
    }

    /// Make an article URL fail.
    pub fn fail_article(self, url: impl Into<String>) -> Self {
        self.fail_articles.write().unwrap().insert(url.into());
        self
    }

    /// Make a listing URL fail.
    pub fn fail_listing(self, url: impl Into<String>) -> Self {
        self.fail_listings.write().unwrap().insert(url.into());
        self
    }

    /// Listing URLs fetched, in order.
    pub fn listing_fetches(&self) -> Vec<String> {
        self.listing_fetches.lock().unwrap().clone()
    }

    /// Article URLs fetched, in order.
    pub fn article_fetches(&self) -> Vec<String> {
        self.article_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleFetcher for MockFetcher {
    async fn fetch_listing(&self, url: &str) -> FetchResult<ListingPage> {
        self.listing_fetches.lock().unwrap().push(url.to_string());

        if self.fail_listings.read().unwrap().contains(url) {
            return Err(FetchError::Http {
                url: url.to_string(),
                message: "mock connection refused".to_string(),
            });
        }

        if let Some(page) = self.listings.read().unwrap().get(url) {
            return Ok(page.clone());
        }
        Ok(self
            .default_listing
            .read()
            .unwrap()
            .clone()
            .unwrap_or_default())
    }

    async fn fetch_article(&self, url: &str) -> FetchResult<ArticleRecord> {
        self.article_fetches.lock().unwrap().push(url.to_string());

        if self.fail_articles.read().unwrap().contains(url) {
            return Err(FetchError::Http {
                url: url.to_string(),
                message: "mock connection refused".to_string(),
            });
        }

        self.articles
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::InvalidUrl {
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> SentimentPrompt {
        SentimentPrompt {
            system_instruction: "analyze".to_string(),
            user_message: "TITLE: x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_replays_script_in_order() {
        let provider = MockProvider::new()
            .with_response("first")
            .with_failure()
            .with_response("third");

        assert_eq!(provider.complete(&prompt()).await.unwrap(), "first");
        assert!(provider.complete(&prompt()).await.is_err());
        assert_eq!(provider.complete(&prompt()).await.unwrap(), "third");
        assert!(provider.complete(&prompt()).await.is_err()); // drained
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_mock_fetcher_defaults() {
        let fetcher = MockFetcher::new()
            .with_listing("https://ex.com/search", ListingPage::new(["https://ex.com/a/1"]))
            .fail_article("https://ex.com/a/1");

        let listing = fetcher.fetch_listing("https://ex.com/search").await.unwrap();
        assert_eq!(listing.article_links.len(), 1);

        // Unknown listing URL resolves to an empty page
        let unknown = fetcher.fetch_listing("https://ex.com/other").await.unwrap();
        assert!(unknown.article_links.is_empty());

        assert!(fetcher.fetch_article("https://ex.com/a/1").await.is_err());
        assert_eq!(fetcher.listing_fetches().len(), 2);
    }
}

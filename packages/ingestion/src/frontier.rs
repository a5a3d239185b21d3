//! Crawl frontier - per-source discovery state machine.
//!
//! Walks one source's paginated listing, skips excluded sections and
//! already-known URLs, stores newly discovered articles, and advances a
//! date cursor when pagination is exhausted. Fetches within one source are
//! strictly sequential; run one frontier instance per source for
//! cross-source concurrency.

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, PipelineError, Result};
use crate::normalize::normalize_record;
use crate::retry::{with_retry, RetryPolicy};
use crate::traits::{ArticleFetcher, ArticleStore};
use crate::types::{Article, SourceConfig};

/// Why a crawl run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Pagination exhausted before any article was extracted; the date
    /// cursor cannot advance.
    NoProgress,

    /// Two consecutive cursor advances completed a pass without storing
    /// anything new.
    PaginationStalled,
}

/// Counters and stop reason from one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub pages_walked: usize,
    pub articles_stored: usize,
    pub skipped_known: usize,
    pub skipped_excluded: usize,
    pub discarded: usize,
    pub fetch_failures: usize,
    pub cursor_advances: usize,
    pub stop: StopReason,
}

/// Crawl frontier for one configured source.
pub struct CrawlFrontier<'a, F, S> {
    source: &'a SourceConfig,
    fetcher: &'a F,
    store: &'a S,
    listing_retry: RetryPolicy,
}

impl<'a, F, S> CrawlFrontier<'a, F, S>
where
    F: ArticleFetcher,
    S: ArticleStore,
{
    pub fn new(source: &'a SourceConfig, fetcher: &'a F, store: &'a S) -> Self {
        Self {
            source,
            fetcher,
            store,
            listing_retry: RetryPolicy::listing_default(),
        }
    }

    /// Override the listing-fetch retry policy (tests use a zero delay).
    pub fn with_listing_retry(mut self, policy: RetryPolicy) -> Self {
        self.listing_retry = policy;
        self
    }

    /// Walk the source until a terminal condition is reached.
    ///
    /// A failed article fetch skips that link only; a listing page that
    /// still fails after retries ends the run with an error.
    pub async fn run(&self) -> Result<CrawlOutcome> {
        let mut outcome = CrawlOutcome {
            pages_walked: 0,
            articles_stored: 0,
            skipped_known: 0,
            skipped_excluded: 0,
            discarded: 0,
            fetch_failures: 0,
            cursor_advances: 0,
            stop: StopReason::NoProgress,
        };

        let mut current_url = self.source.base_listing_url.clone();
        let mut last_seen: Option<Article> = None;
        let mut stored_since_advance = 0usize;
        let mut stalled_advances = 0u32;

        info!(
            media_id = self.source.media_id,
            url = %current_url,
            "starting crawl"
        );

        loop {
            let listing = with_retry(self.listing_retry, "listing fetch", || {
                self.fetcher.fetch_listing(&current_url)
            })
            .await?;
            outcome.pages_walked += 1;

            for link in &listing.article_links {
                let link = match resolve_link(&current_url, link) {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!(link = %link, error = %e, "skipping unparseable article link");
                        outcome.fetch_failures += 1;
                        continue;
                    }
                };

                if let Some(section) = url_section(&link) {
                    if self.source.is_excluded(&section) {
                        debug!(url = %link, section = %section, "section excluded, skipping");
                        outcome.skipped_excluded += 1;
                        continue;
                    }
                }

                if self.store.article_exists(link.as_str()).await? {
                    debug!(url = %link, "article already stored, skipping");
                    outcome.skipped_known += 1;
                    continue;
                }

                let record = match self.fetcher.fetch_article(link.as_str()).await {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(url = %link, error = %e, "article fetch failed, skipping");
                        outcome.fetch_failures += 1;
                        continue;
                    }
                };

                let new_article = match normalize_record(self.source.media_id, record) {
                    Ok(article) => article,
                    Err(e) => {
                        warn!(url = %link, error = %e, "article discarded");
                        outcome.discarded += 1;
                        continue;
                    }
                };

                let article = self.store.upsert_article(&new_article).await?;
                debug!(url = %article.url, article_id = article.id, "stored article");
                outcome.articles_stored += 1;
                stored_since_advance += 1;
                last_seen = Some(article);
            }

            match &listing.next_page {
                Some(next) => {
                    let next_url = resolve_link(&current_url, next)?;
                    debug!(url = %next_url, "following next page");
                    current_url = next_url.into();
                }
                None => {
                    // Pagination exhausted: advance the date cursor past the
                    // most recently extracted article and restart from page 1.
                    let Some(anchor) = &last_seen else {
                        info!(
                            media_id = self.source.media_id,
                            "pagination exhausted with nothing extracted, stopping"
                        );
                        outcome.stop = StopReason::NoProgress;
                        break;
                    };

                    if stored_since_advance == 0 {
                        stalled_advances += 1;
                    } else {
                        stalled_advances = 0;
                    }
                    if stalled_advances >= 2 {
                        info!(
                            media_id = self.source.media_id,
                            "no progress across two cursor advances, stopping"
                        );
                        outcome.stop = StopReason::PaginationStalled;
                        break;
                    }

                    current_url = advance_cursor(self.source, anchor.published_at)?;
                    stored_since_advance = 0;
                    outcome.cursor_advances += 1;
                    info!(
                        url = %current_url,
                        anchor = %anchor.published_at,
                        "pagination exhausted, re-querying with advanced date cursor"
                    );
                }
            }
        }

        info!(
            media_id = self.source.media_id,
            pages = outcome.pages_walked,
            stored = outcome.articles_stored,
            skipped_known = outcome.skipped_known,
            skipped_excluded = outcome.skipped_excluded,
            discarded = outcome.discarded,
            failures = outcome.fetch_failures,
            "crawl finished"
        );
        Ok(outcome)
    }
}

/// Resolve a possibly-relative link against the page it appeared on.
fn resolve_link(base: &str, link: &str) -> Result<Url> {
    let base = Url::parse(base).map_err(|_| {
        PipelineError::Fetch(FetchError::InvalidUrl {
            url: base.to_string(),
        })
    })?;
    base.join(link).map_err(|_| {
        PipelineError::Fetch(FetchError::InvalidUrl {
            url: link.to_string(),
        })
    })
}

/// The section of an article URL: its first non-empty path segment,
/// lowercased.
fn url_section(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_ascii_lowercase())
}

/// Re-issue the original listing query with its date-range bound set to
/// 23:59:59 (in the source's configured UTC offset) of the anchor article's
/// publication date.
fn advance_cursor(source: &SourceConfig, anchor: DateTime<Utc>) -> Result<String> {
    let offset = FixedOffset::east_opt(source.cursor_utc_offset_hours * 3600).ok_or_else(|| {
        PipelineError::Config(format!(
            "invalid cursor UTC offset: {}h",
            source.cursor_utc_offset_hours
        ))
    })?;

    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
    let cursor = anchor
        .with_timezone(&offset)
        .date_naive()
        .and_time(end_of_day)
        .and_local_timezone(offset)
        .unwrap();

    let mut url = Url::parse(&source.base_listing_url).map_err(|_| {
        PipelineError::Fetch(FetchError::InvalidUrl {
            url: source.base_listing_url.clone(),
        })
    })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != source.cursor_param.as_str())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(&source.cursor_param, &cursor.to_rfc3339());
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::MockFetcher;
    use crate::traits::ListingPage;
    use crate::types::{ArticleRecord, NewArticle};
    use chrono::TimeZone;

    fn source() -> SourceConfig {
        SourceConfig::new(
            2,
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00",
        )
        .with_excluded_sections(["sport"])
    }

    fn record(id: i64, url: &str) -> ArticleRecord {
        ArticleRecord {
            source_article_id: Some(id),
            url: url.to_string(),
            title: Some(format!("Article {id}")),
            published_at: Some(Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap()),
            authors: None,
            paywall: false,
            category: None,
            preview_url: None,
            paragraphs: vec!["Some body text.".to_string()],
        }
    }

    fn stored(id: i64, url: &str) -> NewArticle {
        NewArticle {
            source_article_id: id,
            media_id: 2,
            url: url.to_string(),
            title: format!("Article {id}"),
            published_at: Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap(),
            authors: None,
            paywall: false,
            category: None,
            preview_url: None,
            body: "Stored body.".to_string(),
        }
    }

    #[test]
    fn test_url_section_takes_first_path_segment() {
        let url = Url::parse("https://news.example.com/sport/football/123").unwrap();
        assert_eq!(url_section(&url).as_deref(), Some("sport"));

        let bare = Url::parse("https://news.example.com/").unwrap();
        assert_eq!(url_section(&bare), None);
    }

    #[test]
    fn test_advance_cursor_replaces_parameter_at_end_of_day() {
        let anchor = Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap();
        let advanced = advance_cursor(&source(), anchor).unwrap();
        let url = Url::parse(&advanced).unwrap();

        let cursor = url
            .query_pairs()
            .find(|(key, _)| key == "start")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert_eq!(cursor, "2025-03-10T23:59:59+02:00");

        // The rest of the query survives
        assert!(url.query_pairs().any(|(k, v)| k == "sections" && v == "81"));
        // And the old cursor value is gone
        assert_eq!(
            url.query_pairs().filter(|(k, _)| k == "start").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_known_link_skipped_and_cursor_advanced() {
        // Listing has two links, one already stored, and no next page:
        // only the new link is fetched, then the query is re-issued with
        // the cursor at the new article's date 23:59:59.
        let store = MemoryStore::new();
        store
            .upsert_article(&stored(1, "https://news.example.com/politics/1"))
            .await
            .unwrap();

        let listing_url =
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00";
        let fetcher = MockFetcher::new()
            .with_listing(
                listing_url,
                ListingPage::new([
                    "https://news.example.com/politics/1",
                    "https://news.example.com/politics/2",
                ]),
            )
            .with_article(
                "https://news.example.com/politics/2",
                record(2, "https://news.example.com/politics/2"),
            );

        let source = source();
        let outcome = CrawlFrontier::new(&source, &fetcher, &store)
            .with_listing_retry(RetryPolicy::immediate(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.articles_stored, 1);
        assert_eq!(outcome.skipped_known, 1);
        // The stall rule allows two empty advances before stopping.
        assert_eq!(outcome.cursor_advances, 2);
        assert_eq!(outcome.stop, StopReason::PaginationStalled);
        assert_eq!(fetcher.article_fetches(), vec![
            "https://news.example.com/politics/2".to_string()
        ]);

        // The cursor re-query was requested with the article's date at
        // end of day.
        let requeried = fetcher.listing_fetches().into_iter().any(|u| {
            u.contains("2025-03-10T23%3A59%3A59%2B02%3A00")
                || u.contains("2025-03-10T23:59:59+02:00")
        });
        assert!(requeried, "expected a re-query with the advanced cursor");
    }

    #[tokio::test]
    async fn test_excluded_section_never_fetched() {
        let store = MemoryStore::new();
        let listing_url =
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00";
        let fetcher = MockFetcher::new()
            .with_listing(
                listing_url,
                ListingPage::new([
                    "https://news.example.com/sport/99",
                    "https://news.example.com/politics/3",
                ]),
            )
            .with_article(
                "https://news.example.com/politics/3",
                record(3, "https://news.example.com/politics/3"),
            );

        let source = source();
        let outcome = CrawlFrontier::new(&source, &fetcher, &store)
            .with_listing_retry(RetryPolicy::immediate(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.skipped_excluded, 1);
        assert_eq!(outcome.articles_stored, 1);
        assert!(!fetcher
            .article_fetches()
            .contains(&"https://news.example.com/sport/99".to_string()));
    }

    #[tokio::test]
    async fn test_article_fetch_failure_skips_link_only() {
        let store = MemoryStore::new();
        let listing_url =
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00";
        let fetcher = MockFetcher::new()
            .with_listing(
                listing_url,
                ListingPage::new([
                    "https://news.example.com/politics/4",
                    "https://news.example.com/politics/5",
                ]),
            )
            .fail_article("https://news.example.com/politics/4")
            .with_article(
                "https://news.example.com/politics/5",
                record(5, "https://news.example.com/politics/5"),
            );

        let source = source();
        let outcome = CrawlFrontier::new(&source, &fetcher, &store)
            .with_listing_retry(RetryPolicy::immediate(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.fetch_failures, 1);
        assert_eq!(outcome.articles_stored, 1);
    }

    #[tokio::test]
    async fn test_pagination_followed_before_cursor_advance() {
        let store = MemoryStore::new();
        let listing_url =
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00";
        let page2_url = "https://news.example.com/search?sections=81&page=2";
        let fetcher = MockFetcher::new()
            .with_listing(
                listing_url,
                ListingPage::new(["https://news.example.com/politics/6"])
                    .with_next_page(page2_url),
            )
            .with_listing(
                page2_url,
                ListingPage::new(["https://news.example.com/politics/7"]),
            )
            .with_article(
                "https://news.example.com/politics/6",
                record(6, "https://news.example.com/politics/6"),
            )
            .with_article(
                "https://news.example.com/politics/7",
                record(7, "https://news.example.com/politics/7"),
            );

        let source = source();
        let outcome = CrawlFrontier::new(&source, &fetcher, &store)
            .with_listing_retry(RetryPolicy::immediate(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.articles_stored, 2);
        assert!(outcome.pages_walked >= 2);
    }

    #[tokio::test]
    async fn test_empty_listing_stops_without_cursor_advance() {
        let store = MemoryStore::new();
        let listing_url =
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00";
        let fetcher =
            MockFetcher::new().with_listing(listing_url, ListingPage::new(Vec::<String>::new()));

        let source = source();
        let outcome = CrawlFrontier::new(&source, &fetcher, &store)
            .with_listing_retry(RetryPolicy::immediate(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.stop, StopReason::NoProgress);
        assert_eq!(outcome.cursor_advances, 0);
        assert_eq!(outcome.articles_stored, 0);
    }

    #[tokio::test]
    async fn test_two_stalled_cursor_advances_stop_the_run() {
        // One article on the first pass; every later pass rediscovers only
        // that article, so two consecutive advances make no progress.
        let store = MemoryStore::new();
        let listing_url =
            "https://news.example.com/search?sections=81&start=1970-01-01T01:00:00+02:00";
        let fetcher = MockFetcher::new()
            .with_default_listing(ListingPage::new(["https://news.example.com/politics/8"]))
            .with_listing(
                listing_url,
                ListingPage::new(["https://news.example.com/politics/8"]),
            )
            .with_article(
                "https://news.example.com/politics/8",
                record(8, "https://news.example.com/politics/8"),
            );

        let source = source();
        let outcome = CrawlFrontier::new(&source, &fetcher, &store)
            .with_listing_retry(RetryPolicy::immediate(1))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.stop, StopReason::PaginationStalled);
        assert_eq!(outcome.articles_stored, 1);
        assert_eq!(outcome.cursor_advances, 2);
    }
}

//! Crawl source configuration.

use std::collections::HashSet;

/// Configuration for crawling one media source's paginated listing.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Media this source feeds into
    pub media_id: i32,

    /// The listing query the crawl starts from (and re-issues after a
    /// cursor advance)
    pub base_listing_url: String,

    /// Query parameter holding the listing's date-range bound
    pub cursor_param: String,

    /// UTC offset (hours) used when formatting the date cursor
    pub cursor_utc_offset_hours: i32,

    /// URL path sections whose articles are never fetched
    pub excluded_sections: HashSet<String>,
}

impl SourceConfig {
    /// Create a source config with the default cursor parameter (`start`)
    /// and an Eastern European UTC offset.
    pub fn new(media_id: i32, base_listing_url: impl Into<String>) -> Self {
        Self {
            media_id,
            base_listing_url: base_listing_url.into(),
            cursor_param: "start".to_string(),
            cursor_utc_offset_hours: 2,
            excluded_sections: HashSet::new(),
        }
    }

    /// Set the date-cursor query parameter name.
    pub fn with_cursor_param(mut self, param: impl Into<String>) -> Self {
        self.cursor_param = param.into();
        self
    }

    /// Set the UTC offset used when formatting the date cursor.
    pub fn with_cursor_offset_hours(mut self, hours: i32) -> Self {
        self.cursor_utc_offset_hours = hours;
        self
    }

    /// Add excluded URL path sections.
    pub fn with_excluded_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sections
            .extend(sections.into_iter().map(|s| s.into().to_ascii_lowercase()));
        self
    }

    /// Check whether a URL path section is excluded.
    pub fn is_excluded(&self, section: &str) -> bool {
        self.excluded_sections.contains(&section.to_ascii_lowercase())
    }
}

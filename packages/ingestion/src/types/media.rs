//! Media source types.
//!
//! Media rows are owned by configuration/seed data and are read-only from
//! the pipeline's perspective.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A configured media source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: i32,
    pub title: String,
    pub base_url: String,
    pub slug: String,
    pub language_code: String,
}

impl Media {
    pub fn new(
        id: i32,
        title: impl Into<String>,
        base_url: impl Into<String>,
        slug: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            base_url: base_url.into(),
            slug: slug.into(),
            language_code: language_code.into(),
        }
    }
}

/// One chief-editor tenure in a media's ordered editor history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorTenure {
    pub media_id: i32,
    pub name: String,
    pub start_date: NaiveDate,
    /// `None` for the sitting editor
    pub end_date: Option<NaiveDate>,
}

impl EditorTenure {
    pub fn new(media_id: i32, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            media_id,
            name: name.into(),
            start_date,
            end_date: None,
        }
    }

    pub fn ended(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

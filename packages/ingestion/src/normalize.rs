//! Text normalization applied to extracted fields before storage.
//!
//! Pure functions: no I/O, no store access. Body text goes through full
//! cleanup; title/author/category fields are only trimmed.

use tracing::warn;

use crate::error::ValidationError;
use crate::types::{ArticleRecord, NewArticle};

/// Clean scraped text: collapse non-breaking and zero-width spaces to
/// regular spaces, strip HTML character entities, collapse whitespace runs
/// to a single space, and trim the ends.
pub fn clean_text(text: &str) -> String {
    let special_spaces = regex::Regex::new(r"[\u{00a0}\u{200b}]").unwrap();
    let entities = regex::Regex::new(r"&[a-zA-Z]+;").unwrap();
    let whitespace = regex::Regex::new(r"\s+").unwrap();

    let cleaned = special_spaces.replace_all(text, " ");
    let cleaned = entities.replace_all(&cleaned, "");
    let cleaned = whitespace.replace_all(&cleaned, " ");
    cleaned.trim().to_string()
}

/// Join body paragraphs and run them through [`clean_text`].
pub fn serialize_body(paragraphs: &[String]) -> String {
    clean_text(&paragraphs.join(" "))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a raw record into a storable article.
///
/// Records without a publication timestamp are rejected rather than stored
/// with a null timestamp, since downstream ordering depends on it. An empty
/// body or a missing source article id is likewise rejected.
pub fn normalize_record(
    media_id: i32,
    record: ArticleRecord,
) -> Result<NewArticle, ValidationError> {
    let url = record.url;

    let source_article_id = record
        .source_article_id
        .ok_or_else(|| ValidationError::MissingSourceId { url: url.clone() })?;

    let published_at = record.published_at.ok_or_else(|| {
        warn!(url = %url, "article has no publication timestamp, discarding");
        ValidationError::MissingTimestamp { url: url.clone() }
    })?;

    let body = serialize_body(&record.paragraphs);
    if body.is_empty() {
        return Err(ValidationError::EmptyBody { url });
    }

    Ok(NewArticle {
        source_article_id,
        media_id,
        title: trimmed(record.title).unwrap_or_default(),
        published_at,
        authors: trimmed(record.authors),
        paywall: record.paywall,
        category: trimmed(record.category),
        preview_url: trimmed(record.preview_url),
        body,
        url,
    })
}

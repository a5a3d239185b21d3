//! Sentiment decomposer - expand one raw result into normalized rows.
//!
//! Derived rows exist if and only if a parseable raw result exists for the
//! sentiment id; decomposition is safely re-runnable without creating
//! duplicates. Persistence happens through a single
//! [`ArticleStore::apply_decomposition`] call so readers never observe a
//! half-written decomposition.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DecomposeError;
use crate::traits::{store::DecomposeSummary, ArticleStore};
use crate::types::{ArticleScores, EntityScore, SentimentAnalysis};

/// Decompose one raw sentiment result into the normalized tables.
///
/// Missing or ill-typed article scores fail the whole call with
/// [`DecomposeError::MalformedDocument`] (the orchestrator reacts with one
/// re-request cycle); malformed entity entries are skipped individually.
pub async fn decompose<S>(
    store: &S,
    analysis: &SentimentAnalysis,
) -> Result<DecomposeSummary, DecomposeError>
where
    S: ArticleStore,
{
    let scores = parse_article_scores(&analysis.raw_result, analysis.id)?;
    let parties = parse_entities(&analysis.raw_result, "parties")?;
    let politicians = parse_entities(&analysis.raw_result, "politicians")?;

    let summary = store
        .apply_decomposition(analysis.id, &scores, &parties, &politicians)
        .await?;

    debug!(
        sentiment_id = analysis.id,
        article_inserted = summary.article_inserted,
        entities_inserted = summary.entities_inserted,
        entities_existing = summary.entities_existing,
        "decomposition applied"
    );
    Ok(summary)
}

fn malformed(reason: impl Into<String>) -> DecomposeError {
    DecomposeError::MalformedDocument {
        reason: reason.into(),
    }
}

/// Pull the article-level title/body scores out of the raw document.
fn parse_article_scores(raw: &Value, sentiment_id: i64) -> Result<ArticleScores, DecomposeError> {
    let article = raw
        .get("article")
        .ok_or_else(|| malformed("missing `article`"))?;
    let (title_score, title_explanation) = parse_scored_section(article, "title")?;
    let (body_score, body_explanation) = parse_scored_section(article, "body")?;

    Ok(ArticleScores {
        sentiment_id,
        title_score,
        title_explanation,
        body_score,
        body_explanation,
    })
}

fn parse_scored_section(article: &Value, key: &str) -> Result<(i32, String), DecomposeError> {
    let section = article
        .get(key)
        .ok_or_else(|| malformed(format!("missing `article.{key}`")))?;
    let score = section
        .get("score")
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed(format!("`article.{key}.score` is not an integer")))?;
    let explanation = section
        .get("explanation")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("missing `article.{key}.explanation`")))?;
    Ok((score as i32, explanation.to_string()))
}

/// Pull one entity list (`parties` or `politicians`) out of the raw
/// document. The list itself is required; entries with missing fields are
/// skipped with a warning.
fn parse_entities(raw: &Value, key: &str) -> Result<Vec<EntityScore>, DecomposeError> {
    let entries = raw
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(format!("missing `{key}` array")))?;

    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_entity(entry) {
            Some(entity) => parsed.push(entity),
            None => {
                warn!(list = key, entry = %entry, "skipping malformed entity entry");
            }
        }
    }
    Ok(parsed)
}

fn parse_entity(entry: &Value) -> Option<EntityScore> {
    let name = entry.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    // Scores arrive as JSON numbers or strings; keep the raw text either
    // way and let aggregation validate the range.
    let score = match entry.get("score")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };
    let explanation = entry.get("explanation")?.as_str()?;
    Some(EntityScore::new(name, score, explanation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::types::{EntityKind, NewSentimentAnalysis};

    async fn stored_analysis(store: &MemoryStore, raw: serde_json::Value) -> SentimentAnalysis {
        store
            .insert_analysis(&NewSentimentAnalysis {
                article_id: 1,
                model_name: "gemini-2.0-flash".to_string(),
                raw_result: raw,
            })
            .await
            .unwrap()
    }

    fn document() -> serde_json::Value {
        serde_json::json!({
            "article": {
                "title": {"score": 8, "explanation": "objective headline"},
                "body": {"score": 3, "explanation": "one-sided sourcing"}
            },
            "parties": [
                {"name": "Party A", "score": 7, "explanation": "favorable"},
                {"name": "Party B", "score": "2", "explanation": "criticized"}
            ],
            "politicians": [
                {"name": "Jane Doe", "score": 5, "explanation": "neutral"}
            ]
        })
    }

    #[tokio::test]
    async fn test_decompose_writes_all_rows() {
        let store = MemoryStore::new();
        let analysis = stored_analysis(&store, document()).await;

        let summary = decompose(&store, &analysis).await.unwrap();
        assert!(summary.article_inserted);
        assert_eq!(summary.entities_inserted, 3);

        let parties = store
            .list_entity_analyses(EntityKind::Party, 0)
            .await
            .unwrap();
        assert_eq!(parties.len(), 0); // media 0 has no articles

        let scores = store.article_analysis(analysis.id).unwrap();
        assert_eq!(scores.title_score, 8);
        assert_eq!(scores.body_score, 3);
    }

    #[tokio::test]
    async fn test_decompose_twice_leaves_single_rows() {
        let store = MemoryStore::new();
        let analysis = stored_analysis(&store, document()).await;

        let first = decompose(&store, &analysis).await.unwrap();
        let second = decompose(&store, &analysis).await.unwrap();

        assert_eq!(first.entities_inserted, 3);
        assert!(!second.article_inserted);
        assert_eq!(second.entities_inserted, 0);
        assert_eq!(second.entities_existing, 3);
        assert_eq!(store.entity_count(), 3);
    }

    #[tokio::test]
    async fn test_first_write_wins_for_duplicate_names() {
        let store = MemoryStore::new();
        let analysis = stored_analysis(
            &store,
            serde_json::json!({
                "article": {
                    "title": {"score": 5, "explanation": "x"},
                    "body": {"score": 5, "explanation": "x"}
                },
                "parties": [
                    {"name": "Party A", "score": 9, "explanation": "first"},
                    {"name": "Party A", "score": 1, "explanation": "second"}
                ],
                "politicians": []
            }),
        )
        .await;

        decompose(&store, &analysis).await.unwrap();

        let row = store
            .entity_analysis(EntityKind::Party, analysis.id, "Party A")
            .unwrap();
        assert_eq!(row.score, "9");
        assert_eq!(row.explanation, "first");
    }

    #[tokio::test]
    async fn test_malformed_entity_skipped_individually() {
        let store = MemoryStore::new();
        let analysis = stored_analysis(
            &store,
            serde_json::json!({
                "article": {
                    "title": {"score": 5, "explanation": "x"},
                    "body": {"score": 5, "explanation": "x"}
                },
                "parties": [
                    {"name": "No Score Party", "explanation": "missing score"},
                    {"score": 4, "explanation": "missing name"},
                    {"name": "Valid Party", "score": 6, "explanation": "fine"}
                ],
                "politicians": []
            }),
        )
        .await;

        let summary = decompose(&store, &analysis).await.unwrap();
        assert_eq!(summary.entities_inserted, 1);
        assert!(store
            .entity_analysis(EntityKind::Party, analysis.id, "Valid Party")
            .is_some());
    }

    #[tokio::test]
    async fn test_missing_article_scores_is_malformed() {
        let store = MemoryStore::new();
        let analysis = stored_analysis(
            &store,
            serde_json::json!({
                "article": {"title": {"score": "high", "explanation": "x"}},
                "parties": [],
                "politicians": []
            }),
        )
        .await;

        let err = decompose(&store, &analysis).await.unwrap_err();
        assert!(matches!(err, DecomposeError::MalformedDocument { .. }));
        assert!(store.article_analysis(analysis.id).is_none());
    }

    #[tokio::test]
    async fn test_missing_entity_array_is_malformed() {
        let store = MemoryStore::new();
        let analysis = stored_analysis(
            &store,
            serde_json::json!({
                "article": {
                    "title": {"score": 5, "explanation": "x"},
                    "body": {"score": 5, "explanation": "x"}
                },
                "politicians": []
            }),
        )
        .await;

        let err = decompose(&store, &analysis).await.unwrap_err();
        assert!(matches!(err, DecomposeError::MalformedDocument { .. }));
    }
}

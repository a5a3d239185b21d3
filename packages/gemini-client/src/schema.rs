//! Response schema for article sentiment analysis.
//!
//! Built in the Gemini structured-output dialect (uppercase type names,
//! `required`/`properties` per object).

use serde_json::json;

fn scored_section() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "required": ["score", "explanation"],
        "properties": {
            "score": {"type": "INTEGER"},
            "explanation": {"type": "STRING"}
        }
    })
}

fn scored_entity_list() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "required": ["name", "score", "explanation"],
            "properties": {
                "name": {"type": "STRING"},
                "score": {"type": "INTEGER"},
                "explanation": {"type": "STRING"}
            }
        }
    })
}

/// Schema for one article's sentiment document: title/body objectivity
/// scores plus per-party and per-politician sentiment lists.
pub fn sentiment_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "required": ["article", "parties", "politicians"],
        "properties": {
            "article": {
                "type": "OBJECT",
                "required": ["title", "body"],
                "properties": {
                    "title": scored_section(),
                    "body": scored_section()
                }
            },
            "parties": scored_entity_list(),
            "politicians": scored_entity_list()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_shape() {
        let schema = sentiment_response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["article"]["required"][0], "title");
        assert_eq!(schema["properties"]["parties"]["type"], "ARRAY");
        assert_eq!(
            schema["properties"]["politicians"]["items"]["properties"]["score"]["type"],
            "INTEGER"
        );
    }
}

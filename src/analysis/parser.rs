use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::AnalysisError;

/// A fenced block holding one JSON object, with or without the `json` tag.
static FENCED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").unwrap());
static LEADING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```json\s*").unwrap());
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```$").unwrap());

/// Locate the JSON text in a model reply.
///
/// A fenced object wins; otherwise a dangling ```` ```json ```` prefix and
/// ```` ``` ```` suffix are stripped from the trimmed reply.
pub fn extract_json_text(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(caps) = FENCED_OBJECT.captures(trimmed) {
        if let Some(body) = caps.get(1) {
            return body.as_str().to_string();
        }
    }

    let stripped = LEADING_FENCE.replace(trimmed, "");
    TRAILING_FENCE.replace(&stripped, "").into_owned()
}

/// Parse a model reply into the top-level JSON object.
///
/// Any failure, including a non-object value, is a `ResponseParse` error
/// carrying the raw reply.
pub fn parse_model_response(raw: &str) -> Result<Map<String, Value>, AnalysisError> {
    let candidate = extract_json_text(raw);

    let value = serde_json::from_str::<Value>(&candidate).map_err(|e| {
        AnalysisError::ResponseParse {
            raw: raw.to_string(),
            detail: e.to_string(),
        }
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(AnalysisError::ResponseParse {
            raw: raw.to_string(),
            detail: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"interactions": [], "warnings": ["Jděte na pohotovost pokud"]}"#;

    #[test]
    fn bare_json_parses() {
        let map = parse_model_response(BODY).unwrap();
        assert!(map.contains_key("interactions"));
    }

    #[test]
    fn fenced_variants_parse_identically() {
        let bare = parse_model_response(BODY).unwrap();
        let tagged = parse_model_response(&format!("```json\n{BODY}\n```")).unwrap();
        let untagged = parse_model_response(&format!("```\n{BODY}\n```")).unwrap();
        let surrounded =
            parse_model_response(&format!("Here you go:\n```json\n{BODY}\n```\nHope it helps."))
                .unwrap();
        assert_eq!(bare, tagged);
        assert_eq!(bare, untagged);
        assert_eq!(bare, surrounded);
    }

    #[test]
    fn unterminated_fence_is_stripped() {
        let map = parse_model_response(&format!("```json\n{BODY}")).unwrap();
        assert_eq!(map["warnings"][0], "Jděte na pohotovost pokud");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_model_response(&format!("\n\n  {BODY}  \n")).is_ok());
    }

    #[test]
    fn prose_around_bare_object_is_a_parse_error() {
        let raw = format!("Sure! {BODY} Let me know.");
        match parse_model_response(&raw).unwrap_err() {
            AnalysisError::ResponseParse { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_json_is_a_parse_error_with_raw_text() {
        let raw = "I cannot help with that.";
        match parse_model_response(raw).unwrap_err() {
            AnalysisError::ResponseParse { raw: kept, detail } => {
                assert_eq!(kept, raw);
                assert!(!detail.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn broken_json_is_a_parse_error() {
        let err = parse_model_response(r#"{"interactions": [}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::ResponseParse { .. }));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = parse_model_response("[1, 2, 3]").unwrap_err();
        match err {
            AnalysisError::ResponseParse { detail, .. } => assert!(detail.contains("an array")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extract_prefers_fenced_object() {
        let text = format!("noise {{not json}}\n```json\n{BODY}\n```");
        assert_eq!(extract_json_text(&text), BODY);
    }

    #[test]
    fn nested_objects_inside_fence() {
        let raw = "```json\n{\"interactions\": [{\"severity\": \"high\"}]}\n```";
        let map = parse_model_response(raw).unwrap();
        assert_eq!(map["interactions"][0]["severity"], "high");
    }
}

//! Best-effort recovery of the classification object from a model reply.
//!
//! Replies are free-form: the JSON may be wrapped in markdown fences, preceded
//! by commentary, or missing entirely. The candidate object is the slice from
//! the first `{` to the last `}` inclusive; anything else is a parse error and
//! the reply is kept verbatim for inspection.

use crate::domain::model::{Category, ClassificationResult, Urgency};
use serde_json::{Map, Value};

/// Slice of `text` between the first `{` and the last `}`, inclusive.
pub fn json_candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Turn a raw reply into a [`ClassificationResult`]. Never fails.
pub fn extract_classification(raw: &str) -> ClassificationResult {
    let Some(candidate) = json_candidate(raw) else {
        tracing::debug!("No JSON object found in reply");
        return ClassificationResult::unparsed(raw);
    };

    let object: Map<String, Value> = match serde_json::from_str(candidate) {
        Ok(object) => object,
        Err(e) => {
            tracing::debug!("Reply JSON did not decode: {}", e);
            return ClassificationResult::unparsed(raw);
        }
    };

    ClassificationResult {
        category: string_field(&object, &["category"]).and_then(Category::parse),
        urgency: string_field(&object, &["urgency"]).and_then(Urgency::parse),
        intent: string_field(&object, &["intent"]).map(str::to_string),
        suggested_action: string_field(&object, &["suggested_action", "action"])
            .map(str::to_string),
        raw: raw.to_string(),
        parse_error: false,
    }
}

/// String value of the first key in `keys` present in `object`. A present key
/// is final even when its value is null or not a string.
fn string_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| object.get(*key))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_surrounded_by_noise() {
        let raw = r#"noise {"category":"Spam","urgency":"Low","intent":"x","suggested_action":"y"} trailing"#;
        let result = extract_classification(raw);

        assert!(!result.parse_error);
        assert_eq!(result.category, Some(Category::Spam));
        assert_eq!(result.urgency, Some(Urgency::Low));
        assert_eq!(result.intent.as_deref(), Some("x"));
        assert_eq!(result.suggested_action.as_deref(), Some("y"));
        assert_eq!(result.raw, raw);
    }

    #[test]
    fn test_reply_without_braces() {
        let result = extract_classification("I cannot answer");

        assert!(result.parse_error);
        assert_eq!(result.raw, "I cannot answer");
        assert!(result.category.is_none());
        assert!(result.urgency.is_none());
        assert!(result.intent.is_none());
        assert!(result.suggested_action.is_none());
    }

    #[test]
    fn test_unquoted_keys_are_a_parse_error() {
        let result = extract_classification("{category: Spam}");
        assert!(result.parse_error);
        assert_eq!(result.raw, "{category: Spam}");
    }

    #[test]
    fn test_markdown_fenced_reply() {
        let raw = "```json\n{\n  \"category\": \"Lead\",\n  \"urgency\": \"High\",\n  \"intent\": \"Wants a demo\",\n  \"suggested_action\": \"Book a call\"\n}\n```";
        let result = extract_classification(raw);

        assert!(!result.parse_error);
        assert_eq!(result.category, Some(Category::Lead));
        assert_eq!(result.urgency, Some(Urgency::High));
        assert_eq!(result.suggested_action.as_deref(), Some("Book a call"));
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        let raw = r#"{"category": "Customer", "confidence": 0.9}"#;
        let result = extract_classification(raw);

        assert!(!result.parse_error);
        assert_eq!(result.category, Some(Category::Customer));
        assert!(result.urgency.is_none());
        assert!(result.intent.is_none());
        assert!(result.suggested_action.is_none());
    }

    #[test]
    fn test_action_alias() {
        let result = extract_classification(r#"{"action": "Unsubscribe"}"#);
        assert_eq!(result.suggested_action.as_deref(), Some("Unsubscribe"));

        let both = extract_classification(r#"{"suggested_action": "Reply", "action": "Ignore"}"#);
        assert_eq!(both.suggested_action.as_deref(), Some("Reply"));
    }

    #[test]
    fn test_null_suggested_action_shadows_alias() {
        let result =
            extract_classification(r#"{"suggested_action": null, "action": "Ignore"}"#);
        assert!(!result.parse_error);
        assert!(result.suggested_action.is_none());
    }

    #[test]
    fn test_unrecognized_enum_label_maps_to_none() {
        let result = extract_classification(r#"{"category": "Sales", "urgency": 3}"#);
        assert!(!result.parse_error);
        assert!(result.category.is_none());
        assert!(result.urgency.is_none());
    }

    #[test]
    fn test_truncated_reply() {
        let result = extract_classification(r#"{"category": "Spam", "urgency": "Lo"#);
        assert!(result.parse_error);
    }

    #[test]
    fn test_closing_brace_before_opening() {
        assert!(json_candidate("} then {").is_none());
        assert!(extract_classification("} then {").parse_error);
    }

    #[test]
    fn test_non_object_between_braces() {
        // First `{` to last `}` spans two objects, which is not valid JSON.
        let result = extract_classification(r#"{"category": "Spam"} and {"urgency": "Low"}"#);
        assert!(result.parse_error);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let replies = [
            r#"Sure! {"category":"Newsletter","urgency":"Low","intent":"digest","suggested_action":"archive"}"#,
            "I cannot answer",
            "{category: Spam}",
        ];
        for raw in replies {
            assert_eq!(extract_classification(raw), extract_classification(raw));
        }
    }
}

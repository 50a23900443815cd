//! JSON payload extraction from free-form model output.
//!
//! Models wrap their JSON in prose, code fences, or trailing remarks. The
//! extractors take the span from the *first* opening bracket to the *last*
//! closing bracket of the requested kind (greedy), then parse it. Anything
//! outside that span is ignored.

use saga_core::GenerationError;
use serde_json::{Map, Value};

/// Extract the JSON object spanning the first `{` to the last `}` in `raw`.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>, GenerationError> {
    match parse_span(raw, '{', '}')? {
        Value::Object(map) => Ok(map),
        other => Err(GenerationError::malformed(format!(
            "expected a JSON object, found {}",
            type_name(&other)
        ))),
    }
}

/// Extract the JSON array spanning the first `[` to the last `]` in `raw`.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, GenerationError> {
    match parse_span(raw, '[', ']')? {
        Value::Array(items) => Ok(items),
        other => Err(GenerationError::malformed(format!(
            "expected a JSON array, found {}",
            type_name(&other)
        ))),
    }
}

/// Locate the greedy bracket span and parse it.
fn parse_span(raw: &str, open: char, close: char) -> Result<Value, GenerationError> {
    let span = bracket_span(raw, open, close).ok_or_else(|| {
        GenerationError::malformed(format!("no {open}...{close} payload in model output"))
    })?;
    serde_json::from_str(span)
        .map_err(|e| GenerationError::malformed(format!("payload is not valid JSON: {e}")))
}

/// The substring from the first `open` through the last `close`, if ordered.
fn bracket_span(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn object_with_surrounding_prose() {
        let raw = "Here is the trace:\n{\"decision_id\": \"D1\", \"drivers\": [\"M1\"]}\nHope that helps!";
        let map = extract_json_object(raw).unwrap();
        assert_eq!(map["decision_id"], "D1");
        assert_eq!(map["drivers"], json!(["M1"]));
    }

    #[test]
    fn object_inside_code_fence() {
        let raw = "```json\n{\"title\": \"Week 1\"}\n```";
        assert_eq!(extract_json_object(raw).unwrap()["title"], "Week 1");
    }

    #[test]
    fn array_with_nested_objects() {
        let raw = "Sure! [{\"id\": \"M1\", \"tags\": [\"a\"]}, {\"id\": \"M2\"}] done.";
        let items = extract_json_array(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["id"], "M2");
    }

    #[test]
    fn greedy_span_reaches_last_close() {
        // Two objects: the greedy span covers both and is not valid JSON.
        let raw = "{\"a\": 1} and {\"b\": 2}";
        assert_matches!(
            extract_json_object(raw),
            Err(GenerationError::MalformedOutput { .. })
        );
    }

    #[test]
    fn no_brackets_is_malformed() {
        let err = extract_json_array("I cannot help with that.").unwrap_err();
        assert_matches!(err, GenerationError::MalformedOutput { ref message } if message.contains("no [...]"));
    }

    #[test]
    fn reversed_brackets_are_malformed() {
        assert!(extract_json_object("} nothing here {").is_err());
    }

    #[test]
    fn invalid_json_in_span() {
        let err = extract_json_array("[1, 2,, 3]").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn truncated_output_is_malformed() {
        // MAX_TOKENS cut the array short: the last `]` closes an inner array.
        let raw = "[{\"id\": \"M1\", \"tags\": [\"x\"]}, {\"id\": \"M2\", \"te";
        assert!(extract_json_array(raw).is_err());
    }

    #[test]
    fn non_ascii_text_preserved() {
        let raw = "[{\"text\": \"café ☕ — ok\"}]";
        assert_eq!(extract_json_array(raw).unwrap()[0]["text"], "café ☕ — ok");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn prose() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9 .,:;!?\n]{0,60}"
        }

        fn scalar() -> impl Strategy<Value = Value> {
            prop_oneof![
                any::<i64>().prop_map(Value::from),
                any::<bool>().prop_map(Value::from),
                "[a-zA-Z0-9 {}\\[\\]]{0,20}".prop_map(Value::from),
            ]
        }

        fn object() -> impl Strategy<Value = Map<String, Value>> {
            proptest::collection::btree_map("[a-z_]{1,8}", scalar(), 0..6)
                .prop_map(|m| m.into_iter().collect())
        }

        proptest! {
            #[test]
            fn object_survives_prose(before in prose(), obj in object(), after in prose()) {
                let raw = format!("{before}{}{after}", Value::Object(obj.clone()));
                prop_assert_eq!(extract_json_object(&raw).unwrap(), obj);
            }

            #[test]
            fn array_survives_prose(
                before in prose(),
                items in proptest::collection::vec(object().prop_map(Value::Object), 0..5),
                after in prose(),
            ) {
                let pretty = serde_json::to_string_pretty(&items).unwrap();
                let raw = format!("{before}{pretty}{after}");
                prop_assert_eq!(extract_json_array(&raw).unwrap(), items);
            }

            #[test]
            fn no_braces_always_malformed(text in "[^{}]{0,80}") {
                let is_malformed = matches!(
                    extract_json_object(&text),
                    Err(GenerationError::MalformedOutput { .. })
                );
                prop_assert!(is_malformed);
            }

            #[test]
            fn no_square_brackets_always_malformed(text in "[^\\[\\]]{0,80}") {
                let is_malformed = matches!(
                    extract_json_array(&text),
                    Err(GenerationError::MalformedOutput { .. })
                );
                prop_assert!(is_malformed);
            }
        }
    }
}

//! Lenient decoding of model output.
//!
//! Model responses drift from the requested JSON shape in predictable ways:
//! a string field arrives as a number, a one-element array, or `null`. This
//! absorbs that drift instead of failing the whole finding.

use serde_json::Value;

/// Coerce `value` into a string field, per `spec.md` §4.6's lenient decoder:
/// string as-is; `null` → `None`; number/boolean → stringified; array →
/// recurse into the first element; object → ignored (`None`).
#[must_use]
pub fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.first().and_then(lenient_string),
        Value::Object(_) => None,
    }
}

/// Extract the outermost `[...]` or `{...}` substring from raw model output
/// that may carry commentary or markdown fences around the JSON payload.
#[must_use]
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let array_start = raw.find('[');
    let object_start = raw.find('{');
    let (start, open, close) = match (array_start, object_start) {
        (Some(a), Some(o)) if a < o => (a, '[', ']'),
        (Some(a), None) => (a, '[', ']'),
        (_, Some(o)) => (o, '{', '}'),
        _ => return None,
    };
    let end = raw.rfind(close)?;
    if end < start {
        return None;
    }
    let _ = open;
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_passes_through() {
        assert_eq!(lenient_string(&json!("bad")), Some("bad".to_string()));
    }

    #[test]
    fn array_recurses_into_first_element() {
        assert_eq!(
            lenient_string(&json!(["bad", {"title": "X"}])),
            Some("bad".to_string())
        );
    }

    #[test]
    fn empty_array_yields_none() {
        assert_eq!(lenient_string(&json!([])), None);
    }

    #[test]
    fn object_is_ignored() {
        assert_eq!(lenient_string(&json!({"title": "X"})), None);
    }

    #[test]
    fn number_and_bool_are_stringified() {
        assert_eq!(lenient_string(&json!(42)), Some("42".to_string()));
        assert_eq!(lenient_string(&json!(true)), Some("true".to_string()));
    }

    #[test]
    fn extracts_array_span_with_surrounding_commentary() {
        let raw = "Sure, here are the findings:\n```json\n[{\"a\":1}]\n```\nHope this helps!";
        assert_eq!(extract_json_span(raw), Some("[{\"a\":1}]"));
    }
}

//! Extraction and normalization of model output.
//!
//! Model output is free text that usually contains a JSON array of suggestion
//! objects somewhere inside it. The first array-shaped span is extracted,
//! parsed, and every element is normalized so that missing or mistyped fields
//! get defaults instead of failing the whole batch.

use rand::Rng;
use serde_json::Value;

use envdesk_types::{Suggestion, SuggestionAction, SuggestionKind};

use crate::error::{Error, Result};

/// Message used when an element has none.
pub const DEFAULT_MESSAGE: &str = "No message provided";
/// Action label used when an element has none.
pub const DEFAULT_ACTION_LABEL: &str = "No action label";
/// Command used when an element has none.
pub const DEFAULT_COMMAND: &str = "none";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Return the first span that starts with `[` + whitespace + `{` and ends with
/// the last `}` + whitespace + `]` after it.
///
/// Returns `None` when no such span exists.
///
/// ```
/// use envdesk_core::suggestions::parse::extract_json_array;
///
/// let text = r#"Sure! [ {"id": "a"}, {"id": "b"} ] Hope this helps."#;
/// assert_eq!(extract_json_array(text), Some(r#"[ {"id": "a"}, {"id": "b"} ]"#));
/// assert_eq!(extract_json_array("no json here"), None);
/// ```
pub fn extract_json_array(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();

    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('[') {
        let start = search_from + offset;
        let brace = skip_whitespace(bytes, start + 1);

        if bytes.get(brace) == Some(&b'{') {
            if let Some(end) = last_closing(bytes, brace + 1) {
                return Some(&text[start..end]);
            }
            // Any later start would have even fewer closing candidates.
            return None;
        }
        search_from = start + 1;
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// End (exclusive) of the last `}` whitespace* `]` sequence whose `}` is at or
/// after `from`.
fn last_closing(bytes: &[u8], from: usize) -> Option<usize> {
    let mut best = None;
    for (i, b) in bytes.iter().enumerate().skip(from) {
        if *b == b'}' {
            let close = skip_whitespace(bytes, i + 1);
            if bytes.get(close) == Some(&b']') {
                best = Some(close + 1);
            }
        }
    }
    best
}

/// Random id of the form `suggestion-xxxxxxx` (seven base-36 characters).
pub fn random_suggestion_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..7)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("suggestion-{suffix}")
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn id_of(item: &Value) -> String {
    match item.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v != 0.0) => n.to_string(),
        _ => random_suggestion_id(),
    }
}

/// Normalize one parsed element, filling in defaults for anything missing.
///
/// `null` elements are rejected; other non-object elements normalize to an
/// all-defaults suggestion.
pub fn normalize(item: &Value) -> Result<Suggestion> {
    if item.is_null() {
        return Err(Error::invalid_response("suggestion element is null"));
    }

    let category = non_empty_str(item.get("type"))
        .map(SuggestionKind::from_lossy)
        .unwrap_or_default();
    let message = non_empty_str(item.get("message")).unwrap_or(DEFAULT_MESSAGE);

    let action = item.get("action");
    let label = non_empty_str(action.and_then(|a| a.get("label"))).unwrap_or(DEFAULT_ACTION_LABEL);
    let command = non_empty_str(action.and_then(|a| a.get("command"))).unwrap_or(DEFAULT_COMMAND);

    let parameter = item
        .get("parameter")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    Ok(Suggestion::new(id_of(item), category, message)
        .with_action(SuggestionAction::new(label, command), parameter))
}

/// Parse model output into suggestions.
///
/// Uses the extracted array span when present, otherwise the whole trimmed
/// text. Anything that is not a JSON array is an error.
pub fn parse_suggestions(text: &str) -> Result<Vec<Suggestion>> {
    let text = text.trim();
    let json = extract_json_array(text).unwrap_or(text);
    let parsed: Value = serde_json::from_str(json)?;

    let Value::Array(items) = parsed else {
        return Err(Error::invalid_response("model output is not a JSON array"));
    };

    items.iter().map(normalize).collect()
}

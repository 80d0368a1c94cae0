//! Pull a JSON object out of free-form completion text

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```json\s*(.*?)```").unwrap();
}

/// Extract the first usable JSON object from `raw`.
///
/// Tried in order: the whole text, the interior of a ```json fence, then the
/// span from the first `{` to the last `}`. Each candidate has template
/// brace doubling (`{{ ... }}`) undone before parsing. Returns `None` when
/// nothing parses to an object.
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(obj) = parse_candidate(trimmed) {
        return Some(obj);
    }

    if let Some(obj) = FENCED_JSON
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_candidate(m.as_str()))
    {
        return Some(obj);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_candidate(&trimmed[start..=end])
}

fn parse_candidate(candidate: &str) -> Option<Map<String, Value>> {
    let candidate = candidate.trim();
    if candidate.starts_with("{{") && candidate.ends_with("}}") {
        let collapsed = candidate.replace("{{", "{").replace("}}", "}");
        if let Some(obj) = parse_object(&collapsed) {
            return Some(obj);
        }
        // Only the outer layer was doubled
        let inner = &candidate[1..candidate.len() - 1];
        if let Some(obj) = parse_object(inner) {
            return Some(obj);
        }
    }
    parse_object(candidate)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

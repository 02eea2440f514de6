//! Lenient parsing of model output into a [`CompanyAnalysis`].
//!
//! Models often wrap the JSON in prose or code fences. The whole reply is
//! tried first; failing that, the first `{...}` span is.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use leadscout_shared::{CompanyAnalysis, NOT_AVAILABLE};

/// First brace-delimited span, non-greedy, spanning lines.
static OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("object regex"));

/// Parse a model reply. Returns `None` when no JSON object can be recovered.
pub fn parse_response(text: &str) -> Option<CompanyAnalysis> {
    let text = text.trim();

    // Valid JSON that is not an object is rejected outright, not rescued.
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => return Some(from_object(&object)),
        Ok(other) => {
            debug!(kind = json_kind(&other), "reply is JSON but not an object");
            return None;
        }
        Err(_) => {}
    }

    let span = OBJECT_RE.find(text)?;
    debug!(span_len = span.len(), "strict parse failed, using embedded object");
    parse_object(span.as_str()).map(|object| from_object(&object))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn from_object(object: &Map<String, Value>) -> CompanyAnalysis {
    CompanyAnalysis {
        summary: field(object, "summary"),
        target_customer: field(object, "target_customer"),
        ai_automation_idea: field(object, "ai_automation_idea"),
    }
}

/// String values are taken as-is; other values keep their JSON form.
fn field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

//! Strict parsing of classifier output.
//!
//! The model's text is parsed as JSON first and validated field by field
//! second. Anything that does not fit becomes [`ParsedIntent::ParseFailure`];
//! callers decide how to recover.

use serde_json::{Map, Value};

use super::IntentResult;

/// Outcome of parsing classifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedIntent {
    /// Well-formed classification.
    Ok(IntentResult),
    /// The text could not be read as a classification.
    ParseFailure(String),
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse `text` as JSON, tolerating code fences and surrounding prose.
pub(crate) fn extract_json(text: &str) -> Result<Value, String> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err("empty response".into());
    }
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    let start = body.find(['{', '[']);
    let end = body.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if s < e => serde_json::from_str(&body[s..=e])
            .map_err(|err| format!("invalid JSON: {err}")),
        _ => Err("no JSON value found".into()),
    }
}

/// Reduce `value` to one object: either an object or a one-element array
/// holding one.
pub(crate) fn single_object(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(mut items) => match items.len() {
            1 => match items.pop() {
                Some(Value::Object(map)) => Ok(map),
                _ => Err("array element is not an object".into()),
            },
            0 => Err("empty array".into()),
            n => Err(format!("expected a single-element array, got {n} elements")),
        },
        other => Err(format!("expected an object, got {}", type_name(&other))),
    }
}

pub(crate) const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(field: &str, expected: &str, got: &Value) -> String {
    format!("field `{field}`: expected {expected}, got {}", type_name(got))
}

fn bool_field(map: &Map<String, Value>, field: &str, default: bool) -> Result<bool, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(mismatch(field, "boolean", other)),
    }
}

fn string_field(map: &Map<String, Value>, field: &str) -> Result<Option<String>, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(mismatch(field, "string or null", other)),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn list_field(
    map: &Map<String, Value>,
    field: &str,
    stringify: bool,
) -> Result<Option<Vec<String>>, String> {
    let items = match map.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(mismatch(field, "array or null", other)),
    };

    items
        .iter()
        .map(|item| {
            let converted = if stringify {
                scalar_to_string(item)
            } else {
                item.as_str().map(str::to_owned)
            };
            converted.ok_or_else(|| {
                let expected = if stringify { "scalar" } else { "string" };
                mismatch(&format!("{field}[]"), expected, item)
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn tool_name(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| {
        !s.is_empty() && !s.eq_ignore_ascii_case("null") && !s.eq_ignore_ascii_case("none")
    })
}

fn validate(map: &Map<String, Value>) -> Result<IntentResult, String> {
    Ok(IntentResult {
        success: bool_field(map, "success", true)?,
        selected_tool: tool_name(string_field(map, "selected_tool")?),
        direct_response: string_field(map, "response")?,
        needs_additional_info: bool_field(map, "needs_additional_info", false)?,
        additional_info_required: list_field(map, "additional_info_required", false)?,
        tool_arguments: list_field(map, "tool_arguments", true)?,
    })
}

/// Parse classifier text into an [`IntentResult`].
///
/// Accepts an object or a single-element array, optionally inside a
/// Markdown code fence. Missing fields take their defaults; numbers and
/// booleans in `tool_arguments` are converted to strings. Fields of the
/// wrong type are a parse failure.
#[must_use]
pub fn parse_intent(text: &str) -> ParsedIntent {
    let parsed = extract_json(text)
        .and_then(single_object)
        .and_then(|map| validate(&map));
    match parsed {
        Ok(result) => ParsedIntent::Ok(result),
        Err(reason) => ParsedIntent::ParseFailure(reason),
    }
}

use serde_json::Value;
use thiserror::Error;

/// Sentinel separating prose from the structured tail in agent output.
pub const A2UI_DELIMITER: &str = "---a2ui_JSON---";

/// Recoverable: the structured tail could not be read, but the prose is
/// still delivered untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("structured payload after the delimiter was malformed: {detail}")]
pub struct MalformedPayload {
    pub detail: String,
}

/// The two channels of one agent reply.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitResponse {
    /// Human-readable text. Never dropped, even when the tail is malformed.
    pub prose: String,
    /// Raw elements of the JSON array after the delimiter; empty when the
    /// delimiter is absent or the tail failed to parse.
    pub payload: Vec<Value>,
    pub warning: Option<MalformedPayload>,
}

/// Splits raw agent output at the first delimiter occurrence.
///
/// No delimiter means the whole text is prose - that is the common case,
/// not an error. A tail that fails to parse as a JSON array yields the full
/// original text as prose plus a `MalformedPayload` warning.
pub fn split_response(raw: &str) -> SplitResponse {
    let Some(at) = raw.find(A2UI_DELIMITER) else {
        return SplitResponse { prose: raw.to_string(), payload: Vec::new(), warning: None };
    };

    let prose = raw[..at].trim_end();
    let tail = &raw[at + A2UI_DELIMITER.len()..];

    match serde_json::from_str::<Value>(tail.trim()) {
        Ok(Value::Array(elements)) => {
            SplitResponse { prose: prose.to_string(), payload: elements, warning: None }
        }
        Ok(other) => SplitResponse {
            prose: raw.to_string(),
            payload: Vec::new(),
            warning: Some(MalformedPayload {
                detail: format!("expected a JSON array, got {}", json_type_name(&other)),
            }),
        },
        Err(parse_error) => SplitResponse {
            prose: raw.to_string(),
            payload: Vec::new(),
            warning: Some(MalformedPayload { detail: parse_error.to_string() }),
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

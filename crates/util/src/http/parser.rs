//! # HTTP Utilities
//!
//! Helpers for interpreting remote HTTP responses: strict JSON parsing,
//! status hints, and extraction of the primary message from error bodies.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use atladmin_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("ATLASSIAN_API_TOKEN"));
///
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: check ATLASSIAN_API_EMAIL and ATLASSIAN_API_TOKEN".into()),
        403 => Some("Forbidden (403). Hint: the API token's account lacks organization or site admin rights".into()),
        _ => None,
    }
}

/// Extract the primary human-readable message from a remote error body.
///
/// Atlassian APIs use several error shapes; the first match wins:
/// `errorMessages[0]`, `message`, `errorMessage`, then the first value of the
/// `errors` object.
///
/// # Example
/// ```rust
/// use atladmin_util::http::extract_remote_error_message;
/// use serde_json::json;
///
/// let body = json!({"errorMessages": ["Group not found"], "errors": {}});
/// assert_eq!(extract_remote_error_message(&body).as_deref(), Some("Group not found"));
/// ```
pub fn extract_remote_error_message(body: &Value) -> Option<String> {
    let first_error_message = body
        .get("errorMessages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.iter().find_map(non_empty_str));
    if let Some(message) = first_error_message {
        return Some(message);
    }

    for key in ["message", "errorMessage"] {
        if let Some(message) = body.get(key).and_then(non_empty_str) {
            return Some(message);
        }
    }

    body.get("errors")
        .and_then(Value::as_object)
        .and_then(|errors| errors.values().find_map(non_empty_str))
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// The error carries the originating status and a truncated, whitespace
/// collapsed preview of the body.
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

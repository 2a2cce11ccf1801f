//! Helpers for turning response bodies into payloads and typed values.

use crate::errors::ClientError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Maximum characters to include from a body in log context
const BODY_PREVIEW_LENGTH: usize = 200;

/// Turns a raw response body into the payload carried by errors.
///
/// JSON bodies are kept as parsed JSON. Anything else (HTML error pages from
/// a proxy, plain text) is kept verbatim as a JSON string. An empty body is
/// `Value::Null`.
pub fn payload_from_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Decodes a successful response payload into `T`.
///
/// On failure, logs a truncated preview of the payload together with
/// `context` so schema drift on the server side is diagnosable.
pub fn decode_with_context<T: DeserializeOwned>(
    payload: Value,
    context: &str,
) -> Result<T, ClientError> {
    let preview = truncate_for_context(&payload.to_string(), BODY_PREVIEW_LENGTH);
    serde_json::from_value(payload).map_err(|e| {
        warn!("Failed to decode {}: {} | Context: {}", context, e, preview);
        ClientError::Json(e)
    })
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
pub fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let truncate_at = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= max_len)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..truncate_at])
}

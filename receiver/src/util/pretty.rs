//! Rendering accepted payloads for the operator log.

use serde_json::Value;

/// Render a webhook body for logging.
///
/// JSON bodies are re-indented with key order preserved. Anything else is
/// shown as (lossy) UTF-8. Only call this after the signature check: the
/// rendered text is for humans and must never be verified against.
pub fn pretty_payload(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned())
}

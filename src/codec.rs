//! Encodes values to the string-only representation kept by drivers.
//!
//! Encoding and decoding never fail: text that is not valid JSON is handed
//! back as a plain string, so entries written by other clients stay readable.
use serde_json::Value;
use tracing::trace;

/// Encodes a value as JSON text.
pub fn serialize(value: &Value) -> String {
    value.to_string()
}

/// Decodes JSON text, returning the raw text unchanged if it is not JSON.
pub fn deserialize(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            trace!(error = %err, "stored text is not JSON, returning it raw");
            Value::String(raw.to_string())
        }
    }
}

//! Canonical response shapes
//!
//! Every gateway call resolves to a [`NormalizedResponse`]; feature modules
//! reshape it into an [`Outcome`] for the front end.

use crate::error::NormalizedError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Canonical `{status, data, message, headers}` shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    /// HTTP status code (0 when no response was received)
    pub status: u16,
    /// Parsed body: JSON value, raw text as a string, or null when empty
    pub data: Value,
    /// Human readable message
    pub message: String,
    /// Response headers, lowercase names
    pub headers: BTreeMap<String, String>,
}

impl NormalizedResponse {
    /// Whether the status is one of `expected`
    #[must_use]
    pub fn has_status(&self, expected: &[u16]) -> bool {
        expected.contains(&self.status)
    }

    /// The `data` field of the body envelope (`{"data": ...}`), if any
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.data.get("data").filter(|v| !v.is_null())
    }

    /// Deserialize the envelope payload into `T`
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.payload()?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(status = self.status, error = %e, "Payload did not match the expected shape");
                None
            }
        }
    }

    /// Deserialize a single record, enveloped or bare
    ///
    /// Reads the `data` envelope when present, otherwise the body object itself.
    pub fn entity_as<T: DeserializeOwned>(&self) -> Option<T> {
        if self.payload().is_some() {
            return self.payload_as();
        }
        if !self.data.is_object() {
            return None;
        }
        match serde_json::from_value(self.data.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(status = self.status, error = %e, "Body did not match the expected shape");
                None
            }
        }
    }
}

/// Result shape handed to the front end: `{ok, message, data?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    /// Whether the backend answered with the expected status
    pub ok: bool,
    /// Message to show the user
    pub message: String,
    /// Payload, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    /// Successful outcome
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data,
        }
    }

    /// Failed outcome
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data: None,
        }
    }

    /// Map the payload
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            ok: self.ok,
            message: self.message,
            data: self.data.map(f),
        }
    }
}

/// String field of a JSON object, ignoring empty strings
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// `message`, then `error`, then `detail` from a response body
#[must_use]
pub fn body_message(data: &Value) -> Option<&str> {
    str_field(data, "message")
        .or_else(|| str_field(data, "error"))
        .or_else(|| str_field(data, "detail"))
}

/// Message to show for a rejected call, falling back to `default`
#[must_use]
pub fn error_message(err: &NormalizedError, default: &str) -> String {
    body_message(err.data())
        .or_else(|| Some(err.message()).filter(|m| !m.is_empty()))
        .unwrap_or(default)
        .to_string()
}

/// Pull a list out of the shapes the backend answers with
///
/// Tries `data.data`, then `data` itself, then the first array-valued
/// property of an object. Anything else yields an empty list.
#[must_use]
pub fn extract_items(data: &Value) -> Vec<Value> {
    let candidate = match data.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => data,
    };

    match candidate {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .values()
            .find_map(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Decode a list of items, skipping entries that do not match `T`
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "Skipping list item with unexpected shape");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items_envelope() {
        let body = json!({ "data": [{ "id": 1 }, { "id": 2 }] });
        assert_eq!(extract_items(&body).len(), 2);
    }

    #[test]
    fn test_extract_items_bare_array() {
        let body = json!([{ "id": 1 }]);
        assert_eq!(extract_items(&body).len(), 1);
    }

    #[test]
    fn test_extract_items_first_array_property() {
        let body = json!({ "data": { "total": 3, "cars": [{ "id": 7 }] } });
        let items = extract_items(&body);
        assert_eq!(items, vec![json!({ "id": 7 })]);
    }

    #[test]
    fn test_extract_items_error_object() {
        let body = json!({ "message": "nope" });
        assert!(extract_items(&body).is_empty());
        assert!(extract_items(&Value::Null).is_empty());
    }

    #[test]
    fn test_body_message_priority() {
        assert_eq!(body_message(&json!({ "error": "e", "detail": "d" })), Some("e"));
        assert_eq!(body_message(&json!({ "detail": "d" })), Some("d"));
        assert_eq!(body_message(&json!({ "message": "" , "detail": "d" })), Some("d"));
        assert_eq!(body_message(&json!("plain")), None);
    }

    #[test]
    fn test_error_message_falls_back_to_normalized_message() {
        let err = NormalizedError::network();
        // connectivity errors carry their message in the body too
        assert_eq!(error_message(&err, "default"), crate::error::NETWORK_MESSAGE);
    }

    #[test]
    fn test_decode_items_skips_bad_entries() {
        #[derive(Deserialize)]
        struct Item {
            id: i64,
        }
        let items = decode_items::<Item>(vec![json!({ "id": 1 }), json!({ "id": "x" })]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 1);
    }

    #[test]
    fn test_entity_as_reads_envelope_or_bare_body() {
        #[derive(Deserialize)]
        struct Item {
            id: i64,
        }
        let response = |data: Value| NormalizedResponse {
            status: 200,
            data,
            message: String::new(),
            headers: BTreeMap::new(),
        };

        let enveloped = response(json!({ "data": { "id": 1 } }));
        assert_eq!(enveloped.entity_as::<Item>().map(|i| i.id), Some(1));

        let bare = response(json!({ "id": 2 }));
        assert_eq!(bare.entity_as::<Item>().map(|i| i.id), Some(2));

        assert!(response(json!("plain")).entity_as::<Item>().is_none());
        assert!(response(Value::Null).entity_as::<Item>().is_none());
    }

    #[test]
    fn test_outcome_ok_ignores_data_presence() {
        let outcome: Outcome<i32> = Outcome::success("done", None);
        assert!(outcome.ok);
        assert!(outcome.data.is_none());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON wrapper the Connect.Club API puts around every response body.
///
/// `errors` may be non-empty even when `response` is present: server-side
/// validation failures return a partially usable payload alongside the error
/// strings, and the caller decides whether to use it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub request_id: String,
    #[serde(default)]
    pub errors: Vec<String>,
    pub response: T,
}

/// A single entry in the error list of an [`ApiState`].
///
/// Server validation errors arrive as bare strings; transport-level failures
/// carry the failing URL and the request data for diagnostics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ErrorEntry {
    Text(String),
    #[serde(rename_all = "camelCase")]
    Detail {
        text: String,
        url: String,
        data: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl ErrorEntry {
    /// The human-readable message of this entry.
    pub fn text(&self) -> &str {
        match self {
            ErrorEntry::Text(text) => text,
            ErrorEntry::Detail { text, .. } => text,
        }
    }
}

/// Outcome of a single API call: the parsed envelope (when one arrived) plus
/// the accumulated error list.
///
/// Invariant: when `errors` is non-empty the caller must not trust `data`,
/// even if an envelope was parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiState<T> {
    pub data: Option<Envelope<T>>,
    pub errors: Vec<ErrorEntry>,
}

impl<T> ApiState<T> {
    pub fn loaded(envelope: Envelope<T>) -> Self {
        let errors = envelope.errors.iter().cloned().map(ErrorEntry::Text).collect();
        ApiState {
            data: Some(envelope),
            errors,
        }
    }

    pub fn failed(errors: Vec<ErrorEntry>) -> Self {
        ApiState { data: None, errors }
    }

    /// True when the call succeeded with no server-side errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.data.is_some()
    }

    /// The response payload, only when the error list is empty.
    pub fn response(&self) -> Option<&T> {
        if self.errors.is_empty() {
            self.data.as_ref().map(|envelope| &envelope.response)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test that a clean envelope produces a state with no errors.
    #[test]
    fn test_loaded_clean_envelope() {
        let envelope = Envelope {
            request_id: "r1".to_string(),
            errors: vec![],
            response: json!({"id": 3}),
        };
        let state = ApiState::loaded(envelope);
        assert!(state.is_clean());
        assert_eq!(state.response(), Some(&json!({"id": 3})));
    }

    /// Test that envelope errors are copied verbatim into the state.
    #[test]
    fn test_loaded_copies_errors_verbatim() {
        let envelope = Envelope {
            request_id: "r2".to_string(),
            errors: vec!["name is taken".to_string(), "slug too long".to_string()],
            response: json!(null),
        };
        let state = ApiState::loaded(envelope);
        assert_eq!(
            state.errors,
            vec![
                ErrorEntry::Text("name is taken".to_string()),
                ErrorEntry::Text("slug too long".to_string()),
            ]
        );
        // The envelope is still available, but response() refuses to hand it out.
        assert!(state.data.is_some());
        assert!(state.response().is_none());
    }

    /// Test that detailed entries deserialize from the object form.
    #[test]
    fn test_error_entry_deserializes_both_shapes() {
        let text: ErrorEntry = serde_json::from_value(json!("plain")).unwrap();
        assert_eq!(text, ErrorEntry::Text("plain".to_string()));

        let detail: ErrorEntry = serde_json::from_value(json!({
            "text": "connection refused",
            "url": "https://api.example.com/v1/rooms",
            "data": {"id": 1},
            "statusCode": 502
        }))
        .unwrap();
        assert_eq!(detail.text(), "connection refused");
        match detail {
            ErrorEntry::Detail { status_code, .. } => assert_eq!(status_code, Some(502)),
            _ => panic!("expected detail entry"),
        }
    }

    /// Test that the envelope tolerates a missing errors field.
    #[test]
    fn test_envelope_default_errors() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"requestId": "r3", "response": 42})).unwrap();
        assert!(envelope.errors.is_empty());
        assert_eq!(envelope.response, json!(42));
    }
}

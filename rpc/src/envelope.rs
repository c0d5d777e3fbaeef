//!
//! JSON envelope serialization for the request/response messages exchanged
//! over a connection.
//!

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A call correlation token. Peers may mint either a numeric or a string id;
/// both are accepted on the wire and round-tripped verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallId {
    Number(u64),
    Text(String),
}

impl CallId {
    /// Mint a fresh random call id for an outbound request.
    pub fn generate() -> Self {
        CallId::Number(rand::random::<u64>())
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallId::Number(n) => write!(f, "{n}"),
            CallId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Request envelope: a named function call with its positional arguments
/// and the caller's correlation id. `function_name`/`arguments` are `Option`
/// only so a non-request frame (e.g. a response sharing the connection)
/// deserializes to an envelope with both absent rather than failing to
/// parse; a well-formed request always has both set alongside `call_id`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<Value>>,
    pub call_id: CallId,
}

impl RequestEnvelope {
    pub fn new(function_name: String, arguments: Vec<Value>, call_id: CallId) -> Self {
        RequestEnvelope {
            function_name: Some(function_name),
            arguments: Some(arguments),
            call_id,
        }
    }

    pub fn function_name(&self) -> &str {
        self.function_name.as_deref().unwrap_or_default()
    }

    pub fn arguments(&self) -> &[Value] {
        self.arguments.as_deref().unwrap_or_default()
    }
}

/// Response envelope: carries a `callId` paired with either `returnValue` on
/// success or `error` on failure.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<CallId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(call_id: CallId, return_value: Value) -> Self {
        ResponseEnvelope {
            call_id: Some(call_id),
            return_value: Some(return_value),
            error: None,
        }
    }

    pub fn failure(call_id: Option<CallId>, error: String) -> Self {
        ResponseEnvelope {
            call_id,
            return_value: None,
            error: Some(error),
        }
    }
}

/// Returns true if `text` parses as a JSON object carrying either a
/// `functionName` or a `callId` field, i.e. it looks like an envelope this
/// crate produced rather than unrelated JSON traffic.
pub fn is_rpc_message(text: &str) -> bool {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map.contains_key("functionName") || map.contains_key("callId"),
        _ => false,
    }
}

pub fn parse_request(text: &str) -> Result<RequestEnvelope, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn parse_response(text: &str) -> Result<ResponseEnvelope, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format_matches_spec() {
        let request = RequestEnvelope::new(
            "echo".to_string(),
            vec![Value::String("hello".to_string())],
            CallId::Text("1".to_string()),
        );
        let text = serde_json::to_string(&request).unwrap();
        assert_eq!(
            text,
            r#"{"functionName":"echo","arguments":["hello"],"callId":"1"}"#
        );
    }

    #[test]
    fn response_wire_format_matches_spec() {
        let success = ResponseEnvelope::success(CallId::Text("1".to_string()), Value::String("hello".to_string()));
        assert_eq!(
            serde_json::to_string(&success).unwrap(),
            r#"{"callId":"1","returnValue":"hello"}"#
        );

        let failure = ResponseEnvelope::failure(
            Some(CallId::Text("7".to_string())),
            "method not found: missing".to_string(),
        );
        assert_eq!(
            serde_json::to_string(&failure).unwrap(),
            r#"{"callId":"7","error":"method not found: missing"}"#
        );
    }

    #[test]
    fn numeric_call_id_round_trips() {
        let text = r#"{"functionName":"echo","arguments":[],"callId":42}"#;
        let request = parse_request(text).unwrap();
        assert_eq!(request.call_id, CallId::Number(42));
    }

    #[test]
    fn empty_frame_is_not_an_rpc_message() {
        assert!(!is_rpc_message("{}"));
        assert!(!is_rpc_message(r#"{"hello":"world"}"#));
        assert!(is_rpc_message(r#"{"functionName":"echo"}"#));
        assert!(is_rpc_message(r#"{"callId":"1","returnValue":null}"#));
    }

    #[test]
    fn request_missing_call_id_fails_to_parse() {
        let err = parse_request(r#"{"functionName":"ping","arguments":[]}"#);
        assert!(err.is_err());
    }
}

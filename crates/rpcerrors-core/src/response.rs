//! The structured error response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::types::lenient;

/// Request ID echoed by the server, string or number.
///
/// Any JSON number is accepted, negative and fractional ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(Number),
    String(String),
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for RpcId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A failed call as reported by the remote peer: `{ "id": …, "error": {…} }`.
///
/// `S` is the router/procedure's error shape. Any other envelope member
/// (`"jsonrpc"` and friends) is ignored on input, and an `id` that is neither
/// a string nor a number reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse<S> {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    pub error: S,
}

impl<S> ErrorResponse<S> {
    /// Wrap a shape in an envelope without an ID.
    pub fn new(error: S) -> Self {
        Self { id: None, error }
    }

    pub fn with_id(mut self, id: impl Into<RpcId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DefaultErrorShape;
    use serde_json::{json, Value};

    #[test]
    fn parses_jsonrpc_envelope() {
        let resp: ErrorResponse<DefaultErrorShape> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 7,
            "error": { "message": "boom", "code": -32603 }
        }))
        .unwrap();
        assert_eq!(resp.id, Some(RpcId::from(7)));
        assert_eq!(resp.error.message.as_deref(), Some("boom"));
    }

    #[test]
    fn null_and_missing_ids() {
        let resp: ErrorResponse<Value> =
            serde_json::from_value(json!({ "id": null, "error": {} })).unwrap();
        assert_eq!(resp.id, None);

        let resp: ErrorResponse<Value> = serde_json::from_value(json!({ "error": {} })).unwrap();
        assert_eq!(resp.id, None);
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({ "error": {} }));
    }

    #[test]
    fn any_json_number_is_an_id() {
        for (raw, shown) in [(json!(-1), "-1"), (json!(1.5), "1.5"), (json!(7), "7")] {
            let resp: ErrorResponse<Value> =
                serde_json::from_value(json!({ "id": raw, "error": {} })).unwrap();
            assert_eq!(resp.id.map(|id| id.to_string()).as_deref(), Some(shown));
        }
    }

    #[test]
    fn malformed_id_reads_as_absent() {
        let resp: ErrorResponse<Value> =
            serde_json::from_value(json!({ "id": [1], "error": { "message": "x" } })).unwrap();
        assert_eq!(resp.id, None);
        assert_eq!(resp.error, json!({ "message": "x" }));
    }

    #[test]
    fn string_id() {
        let resp = ErrorResponse::new(json!({})).with_id("req-1");
        assert_eq!(resp.id.as_ref().map(ToString::to_string).as_deref(), Some("req-1"));
    }
}

//! JSON-RPC 2.0 reply type.

use rpcerrors_core::{DefaultErrorShape, ErrorOrigin, ErrorResponse, RpcId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// A JSON-RPC 2.0 reply whose `error` member has shape `S`.
///
/// Parsing only fails when the body is not a JSON object. Envelope members of
/// the wrong type read as absent, and an `error` member that does not parse
/// as `S` makes the reply unrecognized instead of failing the whole body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse<S = DefaultErrorShape> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: Option<RpcId>,
    /// `Some(Value::Null)` for an explicit `"result": null`, `None` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<S>,
    #[serde(skip)]
    unreadable_error: bool,
}

impl<S> JsonRpcResponse<S> {
    /// A successful reply.
    pub fn success(id: impl Into<RpcId>, result: Value) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: Some(id.into()),
            result: Some(result),
            error: None,
            unreadable_error: false,
        }
    }

    /// A failed reply.
    pub fn failure(id: impl Into<RpcId>, error: S) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: Some(id.into()),
            result: None,
            error: Some(error),
            unreadable_error: false,
        }
    }

    /// Returns `true` if this is a successful response (has result, no error).
    pub fn is_ok(&self) -> bool {
        !self.unreadable_error && self.error.is_none() && self.result.is_some()
    }

    /// Split the reply into its result or the origin of its failure.
    ///
    /// An `error` member wins over `result`; a reply with neither, or with an
    /// `error` member that did not parse, is [`ErrorOrigin::Unrecognized`].
    pub fn into_outcome(self) -> Result<Value, ErrorOrigin<S>> {
        let ok = self.is_ok();
        match (self.error, self.result) {
            (Some(error), _) => Err(ErrorOrigin::Response(ErrorResponse { id: self.id, error })),
            (None, Some(result)) if ok => Ok(result),
            _ => Err(ErrorOrigin::Unrecognized),
        }
    }
}

/// The reply as it comes off the wire, before `error` is read as a shape.
#[derive(Deserialize)]
struct WireResponse {
    #[serde(default, deserialize_with = "lenient")]
    jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    id: Option<RpcId>,
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl<'de, S: DeserializeOwned> Deserialize<'de> for JsonRpcResponse<S> {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let wire = WireResponse::deserialize(de)?;
        let (error, unreadable_error) = match wire.error {
            Some(raw) => match serde_json::from_value::<S>(raw) {
                Ok(shape) => (Some(shape), false),
                Err(e) => {
                    tracing::debug!(error = %e, "error member does not match the error shape");
                    (None, true)
                }
            },
            None => (None, false),
        };
        Ok(Self {
            jsonrpc: wire.jsonrpc,
            id: wire.id,
            result: wire.result,
            error,
            unreadable_error,
        })
    }
}

/// Parse a reply body.
pub fn decode_response<S>(body: &[u8]) -> Result<JsonRpcResponse<S>, TransportError>
where
    S: DeserializeOwned,
{
    Ok(serde_json::from_slice(body)?)
}

fn present<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(de).map(Some)
}

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

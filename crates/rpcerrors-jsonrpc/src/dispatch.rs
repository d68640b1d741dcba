//! Turning a transport outcome into the value or `ClientError` a caller sees.

use rpcerrors_core::{
    ClientError, DefaultErrorShape, ErrorOrigin, ErrorShape, Meta, NormalizeOptions,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::response::JsonRpcResponse;

/// Result of a call as surfaced to the caller.
pub type ClientResult<T, S = DefaultErrorShape> = Result<T, ClientError<S>>;

/// Metadata key under which the transport records the reply it got.
pub const RESPONSE_KEY: &str = "response";

/// What the transport knows about the reply it got.
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    /// Endpoint the call went to.
    pub url: Option<String>,
    /// HTTP status of the reply, when there was one.
    pub status: Option<u16>,
    /// Caller-supplied context, kept at the top level of the metadata.
    pub extra: Meta,
}

impl ResponseMeta {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            status: None,
            extra: Meta::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// `{ "response": { "url": …, "status": … }, ...extra }`
    ///
    /// A caller-supplied `"response"` object is merged with the transport's
    /// fields, which win on conflict. Any other caller value under that key
    /// is kept as `response.value`.
    pub fn into_meta(self) -> Meta {
        let mut meta = self.extra;
        let mut response = match meta.remove(RESPONSE_KEY) {
            Some(Value::Object(given)) => given,
            Some(other) => {
                let mut nested = Meta::new();
                nested.insert("value".into(), other);
                nested
            }
            None => Meta::new(),
        };
        if let Some(url) = self.url {
            response.insert("url".into(), Value::String(url));
        }
        if let Some(status) = self.status {
            response.insert("status".into(), json!(status));
        }
        meta.insert(RESPONSE_KEY.into(), Value::Object(response));
        meta
    }
}

/// Resolve a transport outcome to the call's result.
///
/// Transport errors become native failures; replies carrying an `error`
/// member become remote failures; replies with neither `result` nor `error`
/// become unrecognized failures. `meta` is attached to every error built here.
pub fn into_client_result<S: ErrorShape>(
    outcome: Result<JsonRpcResponse<S>, TransportError>,
    meta: Option<ResponseMeta>,
) -> ClientResult<Value, S> {
    let origin = match outcome {
        Ok(resp) => match resp.into_outcome() {
            Ok(result) => return Ok(result),
            Err(origin) => origin,
        },
        Err(err) => {
            tracing::debug!(error = %err, "transport failed");
            ErrorOrigin::failure(err)
        }
    };

    let opts = NormalizeOptions {
        meta: meta.map(ResponseMeta::into_meta),
    };
    let err = ClientError::from_origin(origin, opts);
    if err.is_remote() {
        tracing::debug!(error_message = err.message(), "remote call failed");
    }
    Err(err)
}

/// Like [`into_client_result`], then deserialize the result into `T`.
///
/// A result that does not deserialize is a native failure with a
/// [`TransportError::Deserialization`] cause.
pub fn decode_result<T, S>(
    outcome: Result<JsonRpcResponse<S>, TransportError>,
    meta: Option<ResponseMeta>,
) -> ClientResult<T, S>
where
    T: DeserializeOwned,
    S: ErrorShape,
{
    let value = into_client_result(outcome, meta.clone())?;
    serde_json::from_value(value).map_err(|e| {
        ClientError::from_origin(
            ErrorOrigin::failure(TransportError::Deserialization(e)),
            NormalizeOptions {
                meta: meta.map(ResponseMeta::into_meta),
            },
        )
    })
}

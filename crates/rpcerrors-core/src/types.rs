//! Error shapes, the structured description of a remote failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::code::ErrorCode;

// ─── ErrorShape ───────────────────────────────────────────────────────────────

/// The structured error description a remote peer returns for a failed call.
///
/// Each router/procedure decides what its shape looks like; the normalizer
/// only ever reads the two members every shape has in common: an optional
/// human-readable message and an optional machine-readable data payload.
///
/// Both accessors must be total. A shape that lacks a member (or carries a
/// malformed one) reports `None` instead of failing.
pub trait ErrorShape: fmt::Debug + Send + Sync + 'static {
    /// The machine-readable payload embedded in the shape.
    type Data: fmt::Debug + Send + Sync + 'static;

    /// The message carried by the shape, if any.
    fn message(&self) -> Option<&str>;

    /// The embedded data payload, if any.
    fn data(&self) -> Option<&Self::Data>;
}

/// Untyped shapes: `message` is the `"message"` string member and `data` the
/// `"data"` member. Anything that is not a JSON object has neither.
impl ErrorShape for Value {
    type Data = Value;

    fn message(&self) -> Option<&str> {
        self.get("message").and_then(Value::as_str)
    }

    fn data(&self) -> Option<&Value> {
        self.get("data").filter(|d| !d.is_null())
    }
}

// ─── DefaultErrorData ─────────────────────────────────────────────────────────

/// The `data` member of the default error shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultErrorData {
    /// Symbolic error code (e.g. `"BAD_REQUEST"`). Unknown codes read as `None`.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// HTTP status the server answered with.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Dotted procedure path (e.g. `"user.byId"`).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Server-side stack trace, only sent by servers running in development mode.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

// ─── DefaultErrorShape ────────────────────────────────────────────────────────

/// The error shape servers produce unless they install a custom formatter.
///
/// ```json
/// { "message": "Invalid input", "code": -32600,
///   "data": { "code": "BAD_REQUEST", "httpStatus": 400, "path": "post.add" } }
/// ```
///
/// Every member is optional on the wire so that a partially-populated shape
/// still parses; a `data` member that is not an object reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultErrorShape {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// JSON-RPC numeric code (e.g. `-32600`).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub data: Option<DefaultErrorData>,
}

impl DefaultErrorShape {
    /// Build a fully-populated shape for `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            code: Some(code.json_rpc_code()),
            data: Some(DefaultErrorData {
                code: Some(code),
                http_status: Some(code.http_status()),
                path: None,
                stack: None,
            }),
        }
    }

    /// Attach the procedure path to the shape's data.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.data.get_or_insert_with(DefaultErrorData::default).path = Some(path.into());
        self
    }

    /// The symbolic code: `data.code` if present, otherwise derived from the
    /// numeric JSON-RPC code.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.data
            .as_ref()
            .and_then(|d| d.code)
            .or_else(|| self.code.and_then(ErrorCode::from_json_rpc_code))
    }
}

impl ErrorShape for DefaultErrorShape {
    type Data = DefaultErrorData;

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn data(&self) -> Option<&DefaultErrorData> {
        self.data.as_ref()
    }
}

impl fmt::Display for DefaultErrorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_code() {
            Some(code) => write!(f, "{code}: {}", self.message.as_deref().unwrap_or_default()),
            None => write!(f, "{}", self.message.as_deref().unwrap_or_default()),
        }
    }
}

/// Deserialize through `Value` so a member of the wrong type reads as `None`
/// instead of failing the whole shape.
pub(crate) fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! `ClientError`, the single error value an RPC client hands to its caller.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::code::ErrorCode;
use crate::response::ErrorResponse;
use crate::types::{DefaultErrorData, DefaultErrorShape, ErrorShape};

/// Name reported by every [`ClientError`], in text and serialized form.
///
/// Whether a boxed failure is already canonical is decided by its type, see
/// [`is_client_error`].
pub const CLIENT_ERROR_NAME: &str = "RpcClientError";

/// A native failure: transport, serialization, or a bug in client code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Free-form call context attached by whoever normalizes the failure.
pub type Meta = serde_json::Map<String, Value>;

// ─── ClientError ──────────────────────────────────────────────────────────────

/// The canonical RPC client error.
///
/// Exactly one origin is recorded on a normalized error:
/// - a native failure sets [`cause`](Self::cause) and leaves the shape empty;
/// - a structured response sets [`shape`](Self::shape) (and with it
///   [`data`](Self::data)) and leaves the cause empty.
///
/// The value is immutable once built.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError<S: ErrorShape = DefaultErrorShape> {
    message: String,
    #[source]
    cause: Option<BoxError>,
    shape: Option<S>,
    meta: Option<Meta>,
}

/// Inputs to [`ClientError::new`].
#[derive(Debug)]
pub struct ClientErrorOptions<S> {
    /// The structured response that described the failure.
    pub result: Option<ErrorResponse<S>>,
    /// The native failure that caused this error.
    pub cause: Option<BoxError>,
    pub meta: Option<Meta>,
}

impl<S> Default for ClientErrorOptions<S> {
    fn default() -> Self {
        Self {
            result: None,
            cause: None,
            meta: None,
        }
    }
}

impl<S> ClientErrorOptions<S> {
    pub fn with_result(mut self, result: ErrorResponse<S>) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Add one `key → value` pair to the metadata.
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Meta::new)
            .insert(key.into(), value.into());
        self
    }
}

/// The parts of a [`ClientError`], for callers that need to take ownership of
/// the cause or shape.
#[derive(Debug)]
pub struct ClientErrorParts<S> {
    pub message: String,
    pub cause: Option<BoxError>,
    pub shape: Option<S>,
    pub meta: Option<Meta>,
}

impl<S: ErrorShape> ClientError<S> {
    /// Build an error directly. `shape` is taken from `opts.result`.
    ///
    /// Prefer [`ClientError::from_origin`], which decides between cause and
    /// shape and never double-wraps.
    pub fn new(message: impl Into<String>, opts: ClientErrorOptions<S>) -> Self {
        Self {
            message: message.into(),
            cause: opts.cause,
            shape: opts.result.map(|r| r.error),
            meta: opts.meta,
        }
    }

    /// Always [`CLIENT_ERROR_NAME`].
    pub fn name(&self) -> &'static str {
        CLIENT_ERROR_NAME
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The native failure this error wraps, if it came from one.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The remote error shape, if the peer reported the failure.
    pub fn shape(&self) -> Option<&S> {
        self.shape.as_ref()
    }

    /// The data payload embedded in the shape.
    pub fn data(&self) -> Option<&S::Data> {
        self.shape.as_ref().and_then(ErrorShape::data)
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// `true` if the remote peer reported this failure.
    pub fn is_remote(&self) -> bool {
        self.shape.is_some()
    }

    /// `true` if this failure originated in the client or its transport.
    pub fn is_transport(&self) -> bool {
        self.cause.is_some()
    }

    /// Messages of the cause and everything below it, outermost first.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = self
            .cause
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static));
        while let Some(err) = next {
            chain.push(err.to_string());
            next = err.source();
        }
        chain
    }

    pub fn into_parts(self) -> ClientErrorParts<S> {
        ClientErrorParts {
            message: self.message,
            cause: self.cause,
            shape: self.shape,
            meta: self.meta,
        }
    }
}

impl ClientError<DefaultErrorShape> {
    /// The symbolic code of a remote failure.
    pub fn code(&self) -> Option<ErrorCode> {
        self.shape.as_ref().and_then(DefaultErrorShape::error_code)
    }

    /// The HTTP status the server reported, if any.
    pub fn http_status(&self) -> Option<u16> {
        self.data().and_then(|d: &DefaultErrorData| d.http_status)
    }
}

/// `true` if `err` is already a canonical [`ClientError`] for shape `S`.
pub fn is_client_error<S: ErrorShape>(err: &(dyn std::error::Error + 'static)) -> bool {
    err.is::<ClientError<S>>()
}

// ─── ClientErrorLike ──────────────────────────────────────────────────────────

/// Read-only view of a client error: its message, shape, and data.
pub trait ClientErrorLike<S: ErrorShape> {
    fn message(&self) -> &str;

    fn shape(&self) -> Option<&S>;

    fn data(&self) -> Option<&S::Data> {
        self.shape().and_then(ErrorShape::data)
    }
}

impl<S: ErrorShape> ClientErrorLike<S> for ClientError<S> {
    fn message(&self) -> &str {
        ClientError::message(self)
    }

    fn shape(&self) -> Option<&S> {
        ClientError::shape(self)
    }
}

// ─── Serialization ────────────────────────────────────────────────────────────

/// `{ name, message, shape?, data?, meta?, cause? }` where `cause` is the
/// rendered message chain.
impl<S> Serialize for ClientError<S>
where
    S: ErrorShape + Serialize,
    S::Data: Serialize,
{
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        let mut state = serializer.serialize_struct("ClientError", 6)?;
        state.serialize_field("name", CLIENT_ERROR_NAME)?;
        state.serialize_field("message", &self.message)?;
        match &self.shape {
            Some(shape) => state.serialize_field("shape", shape)?,
            None => state.skip_field("shape")?,
        }
        match self.data() {
            Some(data) => state.serialize_field("data", data)?,
            None => state.skip_field("data")?,
        }
        match &self.meta {
            Some(meta) => state.serialize_field("meta", meta)?,
            None => state.skip_field("meta")?,
        }
        if self.cause.is_some() {
            state.serialize_field("cause", &self.cause_chain())?;
        } else {
            state.skip_field("cause")?;
        }
        state.end()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! The error normalizer: turns whatever a failed call produced into a
//! [`ClientError`].
//!
//! Decision order:
//! 1. Native failure that already is a `ClientError` → returned unchanged
//!    (a shapeless one built for another shape type is rebuilt from its parts)
//! 2. Any other native failure                       → `cause` set, no shape
//! 3. Structured error response                      → `shape`/`data` set, no cause
//! 4. Unrecognized value                             → empty message, nothing set

use serde_json::Value;

use crate::error::{BoxError, ClientError, ClientErrorOptions, Meta};
use crate::response::ErrorResponse;
use crate::router::{RouterClientError, RouterOrProcedure};
use crate::types::{DefaultErrorShape, ErrorShape};

/// What a failed call produced, as observed by the transport or dispatch layer.
#[derive(Debug)]
pub enum ErrorOrigin<S> {
    /// Raised by the client, its transport, or the runtime.
    Failure(BoxError),
    /// Reported by the remote peer.
    Response(ErrorResponse<S>),
    /// Neither of the above, e.g. a reply with no result and no error.
    Unrecognized,
}

impl<S> ErrorOrigin<S> {
    /// Wrap any error type as a native failure.
    pub fn failure<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failure(Box::new(err))
    }
}

impl<S> From<BoxError> for ErrorOrigin<S> {
    fn from(err: BoxError) -> Self {
        Self::Failure(err)
    }
}

impl<S> From<ErrorResponse<S>> for ErrorOrigin<S> {
    fn from(resp: ErrorResponse<S>) -> Self {
        Self::Response(resp)
    }
}

impl<S: ErrorShape> From<ClientError<S>> for ErrorOrigin<S> {
    fn from(err: ClientError<S>) -> Self {
        Self::Failure(Box::new(err))
    }
}

/// Per-call options for normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Context attached verbatim to freshly built errors.
    pub meta: Option<Meta>,
}

impl NormalizeOptions {
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

impl<S: ErrorShape> ClientError<S> {
    /// Normalize a failed call into a canonical error.
    ///
    /// Never fails and never wraps twice: a `ClientError<S>` passed back in
    /// as a native failure comes out unchanged, and `opts` is ignored for it.
    ///
    /// A shapeless `ClientError` built for the untyped or default shape is
    /// rebuilt as a `ClientError<S>` with the same message, cause and meta.
    /// One that carries a shape of another type cannot be converted and is
    /// kept as the cause of a new error.
    pub fn from_origin(origin: impl Into<ErrorOrigin<S>>, opts: NormalizeOptions) -> Self {
        match origin.into() {
            ErrorOrigin::Failure(err) => {
                let err = match err.downcast::<ClientError<S>>() {
                    Ok(existing) => {
                        tracing::trace!(origin = "canonical", "client error passed through");
                        return *existing;
                    }
                    Err(err) => err,
                };
                let err = match rebuild_shapeless::<Value, S>(err)
                    .or_else(rebuild_shapeless::<DefaultErrorShape, S>)
                {
                    Ok(rebuilt) => {
                        tracing::trace!(origin = "canonical", "client error rebuilt for shape");
                        return rebuilt;
                    }
                    Err(err) => err,
                };
                tracing::trace!(origin = "failure", error = %err, "normalized native failure");
                ClientError::new(
                    err.to_string(),
                    ClientErrorOptions {
                        result: None,
                        cause: Some(err),
                        meta: opts.meta,
                    },
                )
            }
            ErrorOrigin::Response(resp) => {
                let message = resp.error.message().unwrap_or_default().to_string();
                tracing::trace!(
                    origin = "response",
                    has_data = resp.error.data().is_some(),
                    "normalized error response"
                );
                ClientError::new(
                    message,
                    ClientErrorOptions {
                        result: Some(resp),
                        cause: None,
                        meta: opts.meta,
                    },
                )
            }
            ErrorOrigin::Unrecognized => {
                tracing::trace!(origin = "unrecognized", "normalized unrecognized failure");
                ClientError::new(
                    String::new(),
                    ClientErrorOptions {
                        result: None,
                        cause: None,
                        meta: opts.meta,
                    },
                )
            }
        }
    }
}

/// Convert a `ClientError<T>` without a shape into a `ClientError<S>`.
fn rebuild_shapeless<T, S>(err: BoxError) -> Result<ClientError<S>, BoxError>
where
    T: ErrorShape,
    S: ErrorShape,
{
    let foreign = err.downcast::<ClientError<T>>()?;
    if foreign.shape().is_some() {
        return Err(foreign as BoxError);
    }
    let parts = foreign.into_parts();
    Ok(ClientError::new(
        parts.message,
        ClientErrorOptions {
            result: None,
            cause: parts.cause,
            meta: parts.meta,
        },
    ))
}

impl<S: ErrorShape> From<ErrorResponse<S>> for ClientError<S> {
    fn from(resp: ErrorResponse<S>) -> Self {
        Self::from_origin(resp, NormalizeOptions::default())
    }
}

impl<S: ErrorShape> From<BoxError> for ClientError<S> {
    fn from(err: BoxError) -> Self {
        Self::from_origin(err, NormalizeOptions::default())
    }
}

/// Normalize a failed call against router or procedure `R`.
///
/// ```
/// use rpcerrors_core::{normalize, AnyRouter, ErrorCode, ErrorOrigin, NormalizeOptions};
///
/// let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
/// let err = normalize::<AnyRouter>(ErrorOrigin::failure(io), NormalizeOptions::default());
/// assert_eq!(err.message(), "connection refused");
/// assert!(err.shape().is_none());
/// assert_eq!(err.code(), None::<ErrorCode>);
/// ```
pub fn normalize<R: RouterOrProcedure>(
    origin: impl Into<ErrorOrigin<R::ErrorShape>>,
    opts: NormalizeOptions,
) -> RouterClientError<R> {
    ClientError::from_origin(origin, opts)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{AnyRouter, ProcedureOf, UntypedRouter};
    use serde_json::json;
    use std::error::Error as _;
    use std::io;

    fn boom() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "boom")
    }

    fn meta(key: &str, value: &str) -> NormalizeOptions {
        NormalizeOptions::default().with_meta_entry(key, value)
    }

    fn cause_addr<S: ErrorShape>(err: &ClientError<S>) -> *const () {
        err.cause().map_or(std::ptr::null(), |c| {
            c as *const (dyn std::error::Error + Send + Sync) as *const ()
        })
    }

    #[test]
    fn native_failure_mapping() {
        let err =
            normalize::<UntypedRouter>(ErrorOrigin::failure(boom()), NormalizeOptions::default());
        assert_eq!(err.message(), "boom");
        assert!(err.shape().is_none());
        assert!(err.data().is_none());
        assert!(err.meta().is_none());
        let cause = err.cause().unwrap();
        assert_eq!(
            cause.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::Other)
        );
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }

    #[test]
    fn structured_response_mapping() {
        let response = ErrorResponse::new(json!({
            "message": "Invalid input",
            "data": { "code": "BAD_REQUEST" }
        }));
        let err = normalize::<UntypedRouter>(response.clone(), NormalizeOptions::default());
        assert_eq!(err.message(), "Invalid input");
        assert_eq!(err.shape(), Some(&response.error));
        assert_eq!(err.data(), Some(&json!({ "code": "BAD_REQUEST" })));
        assert!(err.cause().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn missing_message_defaults_to_empty() {
        let err =
            normalize::<UntypedRouter>(ErrorResponse::new(json!({})), NormalizeOptions::default());
        assert_eq!(err.message(), "");
        assert!(err.data().is_none());
        assert!(err.shape().is_some());

        let err = normalize::<AnyRouter>(
            ErrorResponse::new(DefaultErrorShape::default()),
            NormalizeOptions::default(),
        );
        assert_eq!(err.message(), "");
    }

    #[test]
    fn metadata_passthrough() {
        let err = normalize::<AnyRouter>(ErrorOrigin::failure(boom()), meta("requestId", "abc"));
        let mut expected = Meta::new();
        expected.insert("requestId".into(), json!("abc"));
        assert_eq!(err.meta(), Some(&expected));

        let err =
            normalize::<UntypedRouter>(ErrorResponse::new(json!({})), meta("requestId", "abc"));
        assert_eq!(err.meta(), Some(&expected));
    }

    #[test]
    fn renormalizing_is_identity() {
        let first = normalize::<AnyRouter>(ErrorOrigin::failure(boom()), meta("requestId", "abc"));
        let addr = cause_addr(&first);
        let first_meta = first.meta().cloned();

        let second = normalize::<AnyRouter>(first, meta("requestId", "other"));
        assert_eq!(cause_addr(&second), addr);
        assert_eq!(second.meta().cloned(), first_meta);
        assert_eq!(second.message(), "boom");
        assert_eq!(second.cause_chain(), vec!["boom"]);

        let boxed: BoxError = Box::new(second);
        let third: ClientError = ClientError::from_origin(boxed, NormalizeOptions::default());
        assert_eq!(cause_addr(&third), addr);
        assert_eq!(third.meta().cloned(), first_meta);
    }

    #[test]
    fn renormalizing_remote_error_keeps_shape() {
        let shape = json!({ "message": "nope", "data": { "code": "FORBIDDEN" } });
        let first = normalize::<UntypedRouter>(
            ErrorResponse::new(shape.clone()),
            NormalizeOptions::default(),
        );
        let again = normalize::<UntypedRouter>(first, meta("k", "v"));
        assert_eq!(again.shape(), Some(&shape));
        assert!(again.meta().is_none());
        assert!(again.cause().is_none());
    }

    #[test]
    fn procedures_share_their_routers_canonical_errors() {
        let err = normalize::<AnyRouter>(ErrorOrigin::failure(boom()), NormalizeOptions::default());
        let addr = cause_addr(&err);
        let err = normalize::<ProcedureOf<AnyRouter>>(err, NormalizeOptions::default());
        assert_eq!(cause_addr(&err), addr);
        assert!(err.cause().unwrap().downcast_ref::<ClientError>().is_none());
    }

    #[test]
    fn shapeless_error_of_another_shape_is_rebuilt() {
        let untyped = normalize::<UntypedRouter>(ErrorOrigin::failure(boom()), meta("k", "v"));
        let addr = cause_addr(&untyped);
        let typed = normalize::<AnyRouter>(ErrorOrigin::failure(untyped), meta("k", "other"));
        assert_eq!(typed.message(), "boom");
        assert_eq!(cause_addr(&typed), addr);
        assert_eq!(typed.cause_chain(), vec!["boom"]);
        assert_eq!(typed.meta().unwrap()["k"], json!("v"));

        let back =
            normalize::<UntypedRouter>(ErrorOrigin::failure(typed), NormalizeOptions::default());
        assert_eq!(cause_addr(&back), addr);
        assert!(back.cause().unwrap().downcast_ref::<ClientError>().is_none());

        let empty = normalize::<AnyRouter>(ErrorOrigin::Unrecognized, NormalizeOptions::default());
        let untyped =
            normalize::<UntypedRouter>(ErrorOrigin::failure(empty), NormalizeOptions::default());
        assert!(untyped.cause().is_none());
        assert!(untyped.shape().is_none());
    }

    #[test]
    fn shaped_error_of_another_shape_is_wrapped_once() {
        let untyped = normalize::<UntypedRouter>(
            ErrorResponse::new(json!({ "message": "nope" })),
            NormalizeOptions::default(),
        );
        let typed =
            normalize::<AnyRouter>(ErrorOrigin::failure(untyped), NormalizeOptions::default());
        assert_eq!(typed.message(), "nope");
        assert!(typed.shape().is_none());
        let inner = typed.cause().unwrap().downcast_ref::<ClientError<Value>>().unwrap();
        assert_eq!(inner.shape(), Some(&json!({ "message": "nope" })));
    }

    #[test]
    fn unrecognized_origin() {
        let err = normalize::<AnyRouter>(ErrorOrigin::Unrecognized, meta("k", "v"));
        assert_eq!(err.message(), "");
        assert!(err.cause().is_none());
        assert!(err.shape().is_none());
        assert!(err.meta().is_some());
    }

    #[test]
    fn origins_are_mutually_exclusive() {
        let origins: Vec<ErrorOrigin<Value>> = vec![
            ErrorOrigin::failure(boom()),
            ErrorOrigin::Response(ErrorResponse::new(json!({ "message": "x" }))),
            ErrorOrigin::Response(ErrorResponse::new(json!("not an object"))),
            ErrorOrigin::Response(ErrorResponse::new(json!({ "data": null }))),
        ];
        for origin in origins {
            let err = ClientError::from_origin(origin, NormalizeOptions::default());
            assert!(err.cause().is_some() != err.shape().is_some());
            assert!(err.data().is_none() || err.shape().is_some());
        }
    }

    #[test]
    fn from_conversions() {
        let err: ClientError<Value> = ErrorResponse::new(json!({ "message": "m" })).into();
        assert_eq!(err.message(), "m");

        let boxed: BoxError = "plain string failure".into();
        let err: ClientError = boxed.into();
        assert_eq!(err.message(), "plain string failure");
        assert!(err.is_transport());
    }
}

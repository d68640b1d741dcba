//! rpcerrors-core — one error type for every way an RPC call can fail.
//!
//! A call fails either because something on the client side broke (network,
//! serialization, a bug) or because the server ran the call and answered with
//! a structured error. This crate defines:
//!
//! - [`ClientError`] — the canonical error the client hands to its caller
//! - [`ErrorOrigin`] — the two ways a call can fail, as seen by the transport
//! - [`ClientError::from_origin`] / [`normalize`] — the idempotent normalizer
//! - [`ErrorShape`] — the trait every structured error shape implements
//! - [`DefaultErrorShape`] / [`ErrorCode`] — the default server error format
//! - [`RouterOrProcedure`] — ties a call target to its error shape

pub mod code;
pub mod error;
pub mod normalize;
pub mod response;
pub mod router;
pub mod types;

pub use code::ErrorCode;
pub use error::{
    is_client_error, BoxError, ClientError, ClientErrorLike, ClientErrorOptions,
    ClientErrorParts, Meta, CLIENT_ERROR_NAME,
};
pub use normalize::{normalize, ErrorOrigin, NormalizeOptions};
pub use response::{ErrorResponse, RpcId};
pub use router::{
    AnyRouter, InferErrorShape, ProcedureOf, RouterClientError, RouterOrProcedure, UntypedRouter,
};
pub use types::{DefaultErrorData, DefaultErrorShape, ErrorShape};

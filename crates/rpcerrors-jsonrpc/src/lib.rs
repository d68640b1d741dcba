//! rpcerrors-jsonrpc — JSON-RPC dispatch adapter for rpcerrors.
//!
//! Sits between a transport and the caller. Whatever the transport produced
//! (a [`TransportError`] or a [`JsonRpcResponse`]) comes out as either the
//! call's result or a single `rpcerrors_core::ClientError`:
//!
//! - [`into_client_result`] / [`decode_result`] — resolve one call
//! - [`ResponseMeta`] — reply metadata attached to the error's `meta`
//! - [`decode_response`] — parse a reply body

pub mod dispatch;
pub mod error;
pub mod response;

pub use dispatch::{
    decode_result, into_client_result, ClientResult, ResponseMeta, RESPONSE_KEY,
};
pub use error::TransportError;
pub use response::{decode_response, JsonRpcResponse};

//! Compile-time link between a call target and its error shape.

use std::marker::PhantomData;

use serde_json::Value;

use crate::error::ClientError;
use crate::types::{DefaultErrorShape, ErrorShape};

/// A router or a single procedure the client can call.
///
/// Only the associated shape matters: it narrows `ClientError::shape()` and
/// `ClientError::data()` for callers. Nothing at runtime reads it.
pub trait RouterOrProcedure {
    type ErrorShape: ErrorShape;
}

/// The error shape a router or procedure produces.
pub type InferErrorShape<R> = <R as RouterOrProcedure>::ErrorShape;

/// The canonical client error for calls against `R`.
pub type RouterClientError<R> = ClientError<InferErrorShape<R>>;

/// A router using the default error formatter.
#[derive(Debug, Clone, Copy)]
pub enum AnyRouter {}

impl RouterOrProcedure for AnyRouter {
    type ErrorShape = DefaultErrorShape;
}

/// A router whose error shape is not known statically.
#[derive(Debug, Clone, Copy)]
pub enum UntypedRouter {}

impl RouterOrProcedure for UntypedRouter {
    type ErrorShape = Value;
}

/// A single procedure of router `R`. Procedures share their router's shape,
/// so errors normalized for one are canonical for the other.
pub struct ProcedureOf<R>(PhantomData<fn() -> R>);

impl<R: RouterOrProcedure> RouterOrProcedure for ProcedureOf<R> {
    type ErrorShape = R::ErrorShape;
}

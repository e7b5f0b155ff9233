//! Per-request panic isolation.
//!
//! A panic while handling one request becomes a generic 500 for that
//! request only; the worker, shared state and every other request carry on.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::http::response::ApiError;
use crate::observability::logging::panic_message;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

/// Map a caught panic to the generic error envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(panic = %panic_message(err.as_ref()), "Recovered from panic while handling request");
    ApiError::internal().into_response()
}

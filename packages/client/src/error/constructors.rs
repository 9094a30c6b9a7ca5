use std::any::Any;

use http::StatusCode;

use super::types::{ErrorKind, ExceptionDetail, RequestError};
use crate::connect::TransportError;

/// Creates an `InvalidClientState` error for an empty endpoint list.
pub fn no_endpoints() -> RequestError {
    RequestError::new(
        ErrorKind::InvalidClientState,
        "No available endpoints to perform the request",
    )
    .fatal()
}

/// Creates an `InvalidClientState` error for a pinned endpoint with no certificate.
pub fn missing_certificate() -> RequestError {
    RequestError::new(
        ErrorKind::InvalidClientState,
        "No available certificate for pinning purposes",
    )
}

/// Creates an `InvalidClientState` error for a pinned endpoint with no common name.
pub fn missing_common_name() -> RequestError {
    RequestError::new(
        ErrorKind::InvalidClientState,
        "Pinned endpoint has no certificate common name",
    )
}

/// Creates an `UnsuccessfulRequest` error from a response status.
pub fn status_code(status: StatusCode) -> RequestError {
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    RequestError::new(
        ErrorKind::UnsuccessfulRequest,
        format!("({}) {reason}", status.as_u16()),
    )
}

/// Creates an `HttpEngine` error from a transport failure.
pub fn engine(err: &TransportError) -> RequestError {
    RequestError::new(ErrorKind::HttpEngine, err.to_string())
        .with_exception(ExceptionDetail::from_error(err))
}

/// Creates a `ReadingResponse` error from a body read failure.
pub fn reading(err: &TransportError) -> RequestError {
    RequestError::new(
        ErrorKind::ReadingResponse,
        format!("Unable to read response body: {err}"),
    )
    .with_exception(ExceptionDetail::from_error(err))
}

/// Creates a `SerializingResponse` error from a decode failure.
pub fn decode(err: &serde_json::Error) -> RequestError {
    RequestError::new(ErrorKind::SerializingResponse, format!("Decode error {err}"))
        .with_exception(ExceptionDetail::from_error(err))
}

/// Creates an `UnsuccessfulRequest` error from a task that panicked.
pub fn panicked(payload: &(dyn Any + Send)) -> RequestError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "upload task panicked".to_string()
    };

    RequestError::new(ErrorKind::UnsuccessfulRequest, message.clone()).with_exception(
        ExceptionDetail {
            class_name: "panic".to_string(),
            message: Some(message),
            stack_trace: String::new(),
        },
    )
}

/// Creates an `UnsuccessfulRequest` error from a task that was cancelled.
pub fn cancelled() -> RequestError {
    RequestError::new(ErrorKind::UnsuccessfulRequest, "upload task was cancelled")
}

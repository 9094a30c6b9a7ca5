//! Report response model

use bytes::Bytes;
use http::StatusCode;

use crate::connect::TransportError;

/// Status and fully collected body of one phase request.
///
/// A body that could not be read is kept as an error so the caller can
/// still classify the status first.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Result<Bytes, TransportError>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        RawResponse {
            status,
            body: Ok(body.into()),
        }
    }
}

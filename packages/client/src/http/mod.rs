//! HTTP request/response model for the report protocol

pub mod request;
pub mod response;
pub mod status;

pub use request::{MultipartPart, ReportRequest, RequestBody};
pub use response::RawResponse;
pub use status::is_error_status;

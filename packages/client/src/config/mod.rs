//! Fixed protocol constants
//!
//! The report API lives under `/api/v2/report`; every request is HTTPS with
//! a single overall timeout.

use std::time::Duration;

use url::Url;

/// Overall timeout for one phase request, connection included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

pub const CREATE_PATH: &str = "/api/v2/report/create";
pub const ADD_PATH: &str = "/api/v2/report/{id}/add";
pub const FINISH_PATH: &str = "/api/v2/report/{id}/finish";

/// Marker prefixed to every attachment value.
pub const PART_MARKER: &str = "/PIA_PART/";

/// Build `https://{address}{path}`.
///
/// # Errors
///
/// Returns the parse error when `address` is not a valid authority.
pub fn endpoint_url(address: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://{address}{path}"))
}

#[must_use]
pub fn add_path(report_identifier: &str) -> String {
    ADD_PATH.replace("{id}", report_identifier)
}

#[must_use]
pub fn finish_path(report_identifier: &str) -> String {
    FINISH_PATH.replace("{id}", report_identifier)
}

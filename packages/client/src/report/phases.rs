//! The three report phases: create, add attachment, finish
//!
//! A phase knows how to address one endpoint and how to read a successful
//! response. Endpoint iteration and error attribution live in
//! [`super::fallback`].

use bytes::Bytes;
use serde::Deserialize;

use super::endpoint::Endpoint;
use crate::config::{self, CREATE_PATH, PART_MARKER};
use crate::connect::TransportError;
use crate::error::{self, ErrorKind, RequestError};
use crate::http::{MultipartPart, ReportRequest, RequestBody};

/// One request type of the report protocol.
pub trait Phase: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    /// Request to issue against `endpoint`.
    fn request(&self, endpoint: &Endpoint) -> Result<ReportRequest, TransportError>;

    /// Turn the body of a 2xx response into the phase output.
    fn interpret(&self, body: Result<Bytes, TransportError>) -> Result<Self::Output, RequestError>;
}

fn url_for(endpoint: &Endpoint, path: &str) -> Result<url::Url, TransportError> {
    config::endpoint_url(&endpoint.address, path)
        .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", endpoint.address)))
}

#[derive(Debug, Deserialize)]
struct CreateReportResponse {
    code: String,
}

/// Opens a report and yields its server-issued identifier.
#[derive(Debug, Clone)]
pub struct CreateReport {
    meta: String,
    team_identifier: String,
}

impl CreateReport {
    pub fn new(app_version: &str, team_identifier: impl Into<String>) -> Self {
        CreateReport {
            meta: serde_json::json!({ "version": app_version }).to_string(),
            team_identifier: team_identifier.into(),
        }
    }
}

impl Phase for CreateReport {
    type Output = String;

    fn name(&self) -> &'static str {
        "create"
    }

    fn request(&self, endpoint: &Endpoint) -> Result<ReportRequest, TransportError> {
        let mut url = url_for(endpoint, CREATE_PATH)?;
        url.query_pairs_mut()
            .append_pair("meta", &self.meta)
            .append_pair("team", &self.team_identifier);
        Ok(ReportRequest::new(url))
    }

    fn interpret(&self, body: Result<Bytes, TransportError>) -> Result<String, RequestError> {
        let body = body.map_err(|e| error::reading(&e))?;
        let response: CreateReportResponse =
            serde_json::from_slice(&body).map_err(|e| error::decode(&e))?;

        if response.code.trim().is_empty() {
            return Err(RequestError::new(
                ErrorKind::SerializingResponse,
                "Report identifier is empty",
            ));
        }
        Ok(response.code)
    }
}

/// Uploads one provider payload into an open report.
#[derive(Debug, Clone)]
pub struct AddAttachment {
    path: String,
    part: MultipartPart,
}

impl AddAttachment {
    pub fn new(report_identifier: &str, filename: &str, category: &str, value: &str) -> Self {
        AddAttachment {
            path: config::add_path(report_identifier),
            part: MultipartPart {
                name: filename.to_string(),
                filename: format!("{filename}.txt"),
                content_type: "text/plain",
                value: format!("{PART_MARKER}{filename}.{category}\n{value}"),
            },
        }
    }

    #[must_use]
    pub fn part(&self) -> &MultipartPart {
        &self.part
    }
}

impl Phase for AddAttachment {
    type Output = ();

    fn name(&self) -> &'static str {
        "add"
    }

    fn request(&self, endpoint: &Endpoint) -> Result<ReportRequest, TransportError> {
        let url = url_for(endpoint, &self.path)?;
        Ok(ReportRequest::new(url).with_body(RequestBody::Multipart(self.part.clone())))
    }

    fn interpret(&self, _body: Result<Bytes, TransportError>) -> Result<(), RequestError> {
        Ok(())
    }
}

/// Closes a report.
#[derive(Debug, Clone)]
pub struct FinishReport {
    path: String,
}

impl FinishReport {
    pub fn new(report_identifier: &str) -> Self {
        FinishReport {
            path: config::finish_path(report_identifier),
        }
    }
}

impl Phase for FinishReport {
    type Output = ();

    fn name(&self) -> &'static str {
        "finish"
    }

    fn request(&self, endpoint: &Endpoint) -> Result<ReportRequest, TransportError> {
        Ok(ReportRequest::new(url_for(endpoint, &self.path)?))
    }

    fn interpret(&self, _body: Result<Bytes, TransportError>) -> Result<(), RequestError> {
        Ok(())
    }
}

//! Report request model and wire encoding

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, Request};
use http_body_util::Full;
use url::Url;

use crate::crypto::generate_boundary;

/// One text attachment sent as the single field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Form field name.
    pub name: String,
    /// Value of the `filename` parameter in the part's content disposition.
    pub filename: String,
    pub content_type: &'static str,
    pub value: String,
}

impl MultipartPart {
    /// Render the multipart body and return it with its content type.
    #[must_use]
    pub fn encode(&self, boundary: &str) -> (String, Bytes) {
        let mut body = String::with_capacity(self.value.len() + 256);
        body.push_str("--");
        body.push_str(boundary);
        body.push_str("\r\n");
        body.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape_quoted(&self.name),
            escape_quoted(&self.filename),
        ));
        body.push_str(&format!("Content-Type: {}\r\n", self.content_type));
        body.push_str("\r\n");
        body.push_str(&self.value);
        body.push_str("\r\n--");
        body.push_str(boundary);
        body.push_str("--\r\n");

        (
            format!("multipart/form-data; boundary={boundary}"),
            Bytes::from(body),
        )
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Multipart(MultipartPart),
}

/// A POST issued against one endpoint during one report phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub url: Url,
    pub body: RequestBody,
}

impl ReportRequest {
    pub fn new(url: Url) -> Self {
        ReportRequest {
            url,
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Build the HTTP/1.1 request in origin form with an explicit `Host`.
    pub fn to_http(&self) -> Result<Request<Full<Bytes>>, http::Error> {
        let mut target = self.url.path().to_string();
        if let Some(query) = self.url.query() {
            target.push('?');
            target.push_str(query);
        }

        let authority = match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let builder = Request::builder()
            .method(Method::POST)
            .uri(target)
            .header(HOST, authority)
            .header(USER_AGENT, concat!("diagreport/", env!("CARGO_PKG_VERSION")));

        match &self.body {
            RequestBody::Empty => builder
                .header(CONTENT_LENGTH, 0)
                .body(Full::new(Bytes::new())),
            RequestBody::Multipart(part) => {
                let (content_type, bytes) = part.encode(&generate_boundary());
                builder
                    .header(CONTENT_TYPE, content_type)
                    .header(CONTENT_LENGTH, bytes.len())
                    .body(Full::new(bytes))
            }
        }
    }
}

use std::error::Error as StdError;
use std::fmt;

use crate::report::endpoint::Endpoint;

/// Closed set of failure categories a report submission can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The client cannot attempt the request: no endpoints, or pinning
    /// requested without a certificate or common name.
    InvalidClientState,
    /// The server answered with a non-success status code.
    UnsuccessfulRequest,
    /// The response body could not be read.
    ReadingResponse,
    /// The response body could not be decoded.
    SerializingResponse,
    /// Transport construction, connection, TLS or protocol failure.
    HttpEngine,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidClientState => "invalid client state",
            ErrorKind::UnsuccessfulRequest => "unsuccessful request",
            ErrorKind::ReadingResponse => "error reading response",
            ErrorKind::SerializingResponse => "error decoding response",
            ErrorKind::HttpEngine => "http engine error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of the underlying failure that produced a [`RequestError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionDetail {
    pub class_name: String,
    pub message: Option<String>,
    pub stack_trace: String,
}

impl ExceptionDetail {
    /// Capture type name, message and the full `source()` chain of an error.
    pub fn from_error<E: StdError + ?Sized>(err: &E) -> Self {
        let mut stack_trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            stack_trace.push_str("\ncaused by: ");
            stack_trace.push_str(&cause.to_string());
            source = cause.source();
        }

        ExceptionDetail {
            class_name: short_type_name::<E>(),
            message: Some(err.to_string()),
            stack_trace,
        }
    }
}

fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    // keep generics intact, strip only the leading module path
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => full[idx + 2..].to_string(),
        None => full.to_string(),
    }
}

/// One attributable failure recorded while submitting a report.
///
/// A single `send` call accumulates any number of these; none of them is
/// raised past the endpoint-fallback loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub is_fatal: bool,
    pub kind: ErrorKind,
    pub message: Option<String>,
    pub exception: Option<ExceptionDetail>,
    pub provider_context: Option<String>,
    pub endpoint_context: Option<Endpoint>,
}

impl RequestError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RequestError {
            is_fatal: false,
            kind,
            message: Some(message.into()),
            exception: None,
            provider_context: None,
            endpoint_context: None,
        }
    }

    #[must_use = "RequestError builder methods return a new RequestError and should be used"]
    pub fn fatal(mut self) -> Self {
        self.is_fatal = true;
        self
    }

    #[must_use = "RequestError builder methods return a new RequestError and should be used"]
    pub fn with_exception(mut self, exception: ExceptionDetail) -> Self {
        self.exception = Some(exception);
        self
    }

    #[must_use = "RequestError builder methods return a new RequestError and should be used"]
    pub fn with_provider(mut self, provider: Option<&str>) -> Self {
        self.provider_context = provider.map(str::to_owned);
        self
    }

    #[must_use = "RequestError builder methods return a new RequestError and should be used"]
    pub fn with_endpoint(mut self, endpoint: &Endpoint) -> Self {
        self.endpoint_context = Some(endpoint.clone());
        self
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fatal {
            f.write_str("fatal ")?;
        }
        f.write_str(self.kind.as_str())?;

        if let Some(ref message) = self.message {
            write!(f, ": {message}")?;
        }
        if let Some(ref provider) = self.provider_context {
            write!(f, " [{provider}]")?;
        }
        if let Some(ref endpoint) = self.endpoint_context {
            write!(f, " [endpoint: {}]", endpoint.address)?;
        }
        Ok(())
    }
}

impl StdError for RequestError {}

//! Transport failure types

use std::time::Duration;

use crate::tls::TlsError;

/// Failure building a transport or exchanging one request over it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("TLS configuration failed: {0}")]
    Tls(#[from] TlsError),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] std::io::Error),
    #[error("HTTP protocol error: {0}")]
    Http(#[from] hyper::Error),
    #[error("Failed to build HTTP request: {0}")]
    Request(#[from] http::Error),
    #[error("Failed to read response body: {0}")]
    Body(#[source] hyper::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Other(String),
}

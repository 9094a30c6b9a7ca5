//! Transport seams used by the report orchestrator

use std::sync::Arc;

use futures::future::BoxFuture;

use super::error::TransportError;
use crate::http::{RawResponse, ReportRequest};

/// Pinning parameters for one transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedTrust<'a> {
    pub certificate_pem: &'a str,
    pub hostname: &'a str,
    pub common_name: &'a str,
}

/// A configured client able to POST one report request.
pub trait ReportTransport: Send + Sync {
    /// Send `request` and collect the response. No redirects are followed.
    fn post(&self, request: ReportRequest) -> BoxFuture<'_, Result<RawResponse, TransportError>>;
}

/// Builds one transport per endpoint attempt.
///
/// Construction performs no network I/O. Failures are returned, never
/// raised, so the caller can move on to the next endpoint.
pub trait TransportFactory: Send + Sync {
    fn transport(
        &self,
        pin: Option<PinnedTrust<'_>>,
    ) -> Result<Arc<dyn ReportTransport>, TransportError>;
}

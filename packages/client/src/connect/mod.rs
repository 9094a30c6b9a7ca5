//! Report transports
//!
//! The orchestrator talks to [`TransportFactory`] and [`ReportTransport`];
//! [`HttpTransportFactory`] is the production implementation.

pub mod error;
pub mod https;
pub mod transport;

pub use error::TransportError;
pub use https::{HttpTransportFactory, HttpsTransport};
pub use transport::{PinnedTrust, ReportTransport, TransportFactory};

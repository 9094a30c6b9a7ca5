//! # Diagnostic report client
//!
//! Uploads diagnostic attachments to one of several report-collection
//! endpoints over HTTPS.
//!
//! A submission runs three phases, each tried against the endpoints in
//! order until one succeeds:
//!
//! - **create** opens a report and returns its identifier
//! - **add** uploads one attachment per [`LogProvider`], all concurrently
//! - **finish** closes the report
//!
//! Failures never abort a submission. Each one becomes a [`RequestError`]
//! attributed to its endpoint and provider, and the full list is returned
//! with the report identifier.
//!
//! Endpoints flagged for pinning trust a single configured certificate and
//! require the peer to present the expected subject common name; see
//! [`tls::pinning`].
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use diagreport_client::prelude::*;
//!
//! # async fn run() {
//! let endpoints = vec![Endpoint::new("reports.example.com")];
//! let sender = ReportSender::new(Arc::new(HttpTransportFactory::new()), Arc::new(endpoints))
//!     .team_identifier("team")
//!     .app_version("1.0.0")
//!     .provider(Arc::new(StaticLogProvider::new(
//!         ProviderKind::AppInfo,
//!         "app_info",
//!         ReportCategory::Diagnostic,
//!         "build: 42",
//!     )));
//!
//! let outcome = sender.send(false).await;
//! println!("{:?} ({} errors)", outcome.report_identifier, outcome.errors.len());
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod crypto;
pub mod error;
pub mod http;
pub mod platform;
pub mod prelude;
pub mod report;
pub mod security;
pub mod tls;

pub use connect::{
    HttpTransportFactory, PinnedTrust, ReportTransport, TransportError, TransportFactory,
};
pub use error::{ErrorKind, ExceptionDetail, RequestError};
pub use platform::{PlatformData, PreferenceStore, install_panic_hook};
pub use report::{
    Endpoint, EndpointProvider, LogProvider, ProviderKind, ReportCategory, ReportSender,
    SendOutcome, StaticLogProvider,
};
pub use tls::{TlsError, TlsManager};

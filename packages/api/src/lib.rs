//! Diagnostic report uploader
//!
//! Ships locally gathered diagnostics (settings dumps, crash traces,
//! protocol state) to one of several report-collection endpoints,
//! optionally pinning the TLS certificate of specific endpoints.
//!
//! ```no_run
//! use std::sync::Arc;
//! use diagreport::{Endpoint, Reporter, ReporterConfig};
//!
//! # async fn run() -> Result<(), diagreport::ConfigurationError> {
//! let endpoints = vec![
//!     Endpoint::new("reports.example.com"),
//!     Endpoint::pinned("10.0.0.1", "reports.example.com"),
//! ];
//! let pem = std::fs::read_to_string("pinned.pem").unwrap_or_default();
//! let config = ReporterConfig::new("team", "1.0.0", Arc::new(endpoints)).with_certificate(pem);
//!
//! let outcome = Reporter::new(config)?.send(false).await;
//! for error in &outcome.errors {
//!     eprintln!("{error}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod reporter;

pub use config::{ConfigResult, ConfigurationError, ReporterConfig, endpoints_from_json};
pub use reporter::Reporter;

// Re-export the types callers need to build a configuration
pub use diagreport_client::platform::{
    LastKnownExceptionProvider, PlatformData, PreferenceStore, UserSettingsProvider,
    install_panic_hook,
};
pub use diagreport_client::{
    Endpoint, EndpointProvider, ErrorKind, ExceptionDetail, LogProvider, ProviderKind,
    ReportCategory, RequestError, SendOutcome, StaticLogProvider,
};

//! Diagnostic report prelude
//!
//! The types needed to configure endpoints and providers and to send one
//! report.

pub use crate::connect::{HttpTransportFactory, TransportFactory};
pub use crate::error::{ErrorKind, RequestError};
pub use crate::platform::{
    LastKnownExceptionProvider, PlatformData, PreferenceStore, UserSettingsProvider,
};
pub use crate::report::{
    Endpoint, EndpointProvider, LogProvider, ProviderKind, ReportCategory, ReportSender,
    SendOutcome, StaticLogProvider,
};

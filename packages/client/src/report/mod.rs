//! Report submission
//!
//! [`ReportSender`] runs the create, populate and finish phases, each one
//! through the ordered endpoint fallback in [`fallback`].

pub mod endpoint;
pub mod fallback;
pub mod phases;
pub mod provider;
pub mod sender;

pub use endpoint::{Endpoint, EndpointProvider};
pub use fallback::{FallbackContext, PhaseOutcome, run_with_fallback};
pub use phases::{AddAttachment, CreateReport, FinishReport, Phase};
pub use provider::{LogProvider, ProviderKind, ReportCategory, StaticLogProvider, provider_context};
pub use sender::{ReportSender, SendOutcome};

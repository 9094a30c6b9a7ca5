//! TLS configuration and certificate pinning
//!
//! Unpinned endpoints use the platform trust store; pinned endpoints trust
//! exactly one certificate and additionally require a matching hostname and
//! subject common name.

pub mod certificate;
pub mod errors;
pub mod pinning;
pub mod tls_manager;

pub use errors::TlsError;
pub use pinning::{PinnedCertVerifier, PinnedTrustValidator, TrustBackend, WebPkiBackend};
pub use tls_manager::{TlsConfig, TlsManager};

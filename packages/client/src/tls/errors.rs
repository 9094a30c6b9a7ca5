//! TLS-specific error types

/// Failure building a TLS configuration or evaluating a peer.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Certificate parsing failed: {0}")]
    CertificateParsing(String),
    #[error("Trust store error: {0}")]
    TrustStore(String),
    #[error("Certificate chain invalid: {0}")]
    ChainValidation(String),
    #[error("Peer verification failed: {0}")]
    PeerVerification(String),
    #[error("Crypto provider error: {0}")]
    CryptoProvider(String),
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

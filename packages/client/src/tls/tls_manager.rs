//! TLS client configuration
//!
//! Builds rustls client configurations for report transports: one trusting
//! the system roots, and one per pinned (hostname, common name) pair whose
//! trust decision is delegated to [`PinnedCertVerifier`].

use std::sync::{Arc, OnceLock};

use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};

use super::errors::TlsError;
use super::pinning::{PinnedCertVerifier, PinnedTrustValidator, WebPkiBackend};

static SYSTEM_ROOTS: OnceLock<Arc<RootCertStore>> = OnceLock::new();

/// TLS configuration for report transports
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Use the platform certificate store for unpinned endpoints
    pub use_system_certs: bool,
    /// ALPN protocols offered during the handshake
    pub alpn_protocols: Vec<Vec<u8>>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            use_system_certs: true,
            alpn_protocols: vec![b"http/1.1".to_vec()],
        }
    }
}

/// Produces client configurations for unpinned and pinned endpoints.
#[derive(Debug, Clone, Default)]
pub struct TlsManager {
    config: TlsConfig,
}

impl TlsManager {
    /// Create new TLS manager with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create TLS manager with specific configuration
    pub fn with_config(config: TlsConfig) -> Self {
        Self { config }
    }

    /// The crypto provider every configuration is built on.
    pub fn provider() -> Arc<CryptoProvider> {
        Arc::new(rustls::crypto::ring::default_provider())
    }

    /// Configuration trusting the system (or bundled webpki) roots.
    ///
    /// # Errors
    ///
    /// Returns `TlsError::CryptoProvider` if the provider rejects the
    /// default protocol versions.
    pub fn default_client_config(&self) -> Result<ClientConfig, TlsError> {
        let roots = if self.config.use_system_certs {
            SYSTEM_ROOTS.get_or_init(load_system_roots).clone()
        } else {
            Arc::new(webpki_root_store())
        };

        let mut client_config = ClientConfig::builder_with_provider(Self::provider())
            .with_safe_default_protocol_versions()
            .map_err(|e| TlsError::CryptoProvider(e.to_string()))?
            .with_root_certificates(roots)
            .with_no_client_auth();

        client_config.alpn_protocols = self.config.alpn_protocols.clone();
        Ok(client_config)
    }

    /// Configuration whose only trust anchor is `certificate_pem`, accepting
    /// a peer only for `hostname` presenting `common_name`.
    ///
    /// # Errors
    ///
    /// Returns `TlsError::Configuration` for a blank hostname or common name,
    /// or the parsing/trust store error raised by the pinned certificate.
    pub fn pinned_client_config(
        &self,
        certificate_pem: &str,
        hostname: &str,
        common_name: &str,
    ) -> Result<ClientConfig, TlsError> {
        if hostname.trim().is_empty() {
            return Err(TlsError::Configuration(
                "Pinned hostname cannot be empty".to_string(),
            ));
        }
        if common_name.trim().is_empty() {
            return Err(TlsError::Configuration(
                "Pinned common name cannot be empty".to_string(),
            ));
        }

        let provider = Self::provider();
        let backend = WebPkiBackend::from_pem(certificate_pem, provider.clone())?;
        let validator = PinnedTrustValidator::new(backend, hostname, common_name);
        let verifier = Arc::new(PinnedCertVerifier::new(validator, provider.clone()));

        let mut client_config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| TlsError::CryptoProvider(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();

        client_config.alpn_protocols = self.config.alpn_protocols.clone();
        tracing::debug!(
            "Built pinned TLS configuration for {} (common name {})",
            hostname,
            common_name
        );
        Ok(client_config)
    }
}

fn webpki_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    root_store
}

fn load_system_roots() -> Arc<RootCertStore> {
    let mut root_store = RootCertStore::empty();

    let cert_result = rustls_native_certs::load_native_certs();
    for cert in cert_result.certs {
        if let Err(e) = root_store.add(cert) {
            tracing::warn!("Failed to add system certificate: {}", e);
        }
    }

    if !cert_result.errors.is_empty() {
        for err in &cert_result.errors {
            tracing::warn!("Certificate load error: {}", err);
        }
    }

    if root_store.is_empty() {
        // Fall back to webpki roots when the platform store is unusable
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    tracing::debug!("Loaded {} root certificates", root_store.len());
    Arc::new(root_store)
}

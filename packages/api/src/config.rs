//! Reporter configuration and its validation

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use diagreport_client::report::{Endpoint, EndpointProvider, LogProvider, ProviderKind};
use diagreport_client::tls::certificate::certificates_from_pem;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {0}")]
    MissingField(&'static str),

    #[error("More than one provider registered for '{0}'")]
    DuplicateProvider(ProviderKind),

    #[error("Invalid pinning certificate: {0}")]
    InvalidCertificate(String),

    #[error("Invalid endpoint list: {0}")]
    InvalidEndpoints(String),
}

/// Parse an endpoint list from its JSON form, an array of
/// `{"address": .., "is_proxy": .., "use_pinned_certificate": .., "pinned_common_name": ..}`
/// objects where only `address` is required.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidEndpoints` if the JSON does not
/// describe an endpoint array.
pub fn endpoints_from_json(json: &str) -> ConfigResult<Vec<Endpoint>> {
    serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidEndpoints(e.to_string()))
}

/// Everything a [`Reporter`](crate::Reporter) needs.
///
/// Build it as a plain struct and call [`validate`](Self::validate), or let
/// [`Reporter::new`](crate::Reporter::new) do that.
#[derive(Clone)]
pub struct ReporterConfig {
    pub team_identifier: String,
    pub app_version: String,
    /// PEM certificate enabling pinning for endpoints that request it.
    pub certificate: Option<String>,
    pub endpoints: Arc<dyn EndpointProvider>,
    pub log_providers: Vec<Arc<dyn LogProvider>>,
}

impl ReporterConfig {
    pub fn new(
        team_identifier: impl Into<String>,
        app_version: impl Into<String>,
        endpoints: Arc<dyn EndpointProvider>,
    ) -> Self {
        ReporterConfig {
            team_identifier: team_identifier.into(),
            app_version: app_version.into(),
            certificate: None,
            endpoints,
            log_providers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_certificate(mut self, certificate_pem: impl Into<String>) -> Self {
        self.certificate = Some(certificate_pem.into());
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn LogProvider>) -> Self {
        self.log_providers.push(provider);
        self
    }

    /// Check required fields, provider uniqueness and the certificate.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails:
    /// - `MissingField` - if the team identifier or app version is blank
    /// - `DuplicateProvider` - if two providers share a kind
    /// - `InvalidCertificate` - if a certificate is set but holds no PEM certificate
    pub fn validate(&self) -> ConfigResult<()> {
        if self.team_identifier.trim().is_empty() {
            return Err(ConfigurationError::MissingField("team identifier"));
        }
        if self.app_version.trim().is_empty() {
            return Err(ConfigurationError::MissingField("app version"));
        }

        let mut kinds = HashSet::new();
        for provider in &self.log_providers {
            if !kinds.insert(provider.kind()) {
                return Err(ConfigurationError::DuplicateProvider(provider.kind()));
            }
        }

        if let Some(ref certificate) = self.certificate {
            certificates_from_pem(certificate)
                .map_err(|e| ConfigurationError::InvalidCertificate(e.to_string()))?;
        }

        Ok(())
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<ProviderKind> = self.log_providers.iter().map(|p| p.kind()).collect();
        f.debug_struct("ReporterConfig")
            .field("team_identifier", &self.team_identifier)
            .field("app_version", &self.app_version)
            .field("certificate", &self.certificate.as_ref().map(|_| "<pem>"))
            .field("log_providers", &kinds)
            .finish_non_exhaustive()
    }
}

//! Pinned certificate trust validation
//!
//! Replaces default TLS trust evaluation for endpoints flagged for pinning.
//! A peer is accepted only when all of the following hold:
//!
//! 1. its certificate chain builds to the pinned certificate, which is the
//!    sole trust anchor;
//! 2. the hostname of the connection equals the hostname the request was
//!    issued for;
//! 3. the subject common name of the peer certificate equals the expected
//!    common name.
//!
//! Hostname and common name are compared with [`salted_str_eq`] so that the
//! comparison time does not depend on how many leading characters match.
//! Every error, and every panic raised by a backend, rejects the peer.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};

use super::certificate::{certificate_from_pem, subject_common_name};
use super::errors::TlsError;
use crate::security::salted_str_eq;

/// Trust primitives a pinning backend supplies.
///
/// The validator logic is shared; a backend only knows how to evaluate a
/// chain against its anchor and read the subject common name.
pub trait TrustBackend: fmt::Debug + Send + Sync {
    /// Build and verify a chain from `end_entity` to the pinned anchor.
    ///
    /// Hostname matching against the certificate's SAN entries is not part
    /// of this step.
    fn evaluate_chain(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> Result<(), TlsError>;

    /// Subject common name of `end_entity`, if it has one.
    fn common_name(&self, end_entity: &CertificateDer<'_>) -> Result<Option<String>, TlsError>;
}

/// Backend built on rustls' webpki verifier with a single-anchor root store.
#[derive(Debug)]
pub struct WebPkiBackend {
    verifier: Arc<WebPkiServerVerifier>,
}

impl WebPkiBackend {
    /// Use the first certificate of `certificate_pem` as the only trust anchor.
    ///
    /// # Errors
    ///
    /// Returns `TlsError::CertificateParsing` when the PEM holds no
    /// certificate and `TlsError::TrustStore` when it cannot serve as an
    /// anchor.
    pub fn from_pem(
        certificate_pem: &str,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, TlsError> {
        let anchor = certificate_from_pem(certificate_pem)?;

        let mut roots = RootCertStore::empty();
        roots
            .add(anchor)
            .map_err(|e| TlsError::TrustStore(format!("Pinned certificate rejected: {e}")))?;

        let verifier = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .map_err(|e| TlsError::TrustStore(format!("Failed to create webpki verifier: {e}")))?;

        Ok(Self { verifier })
    }
}

impl TrustBackend for WebPkiBackend {
    fn evaluate_chain(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> Result<(), TlsError> {
        match self
            .verifier
            .verify_server_cert(end_entity, intermediates, server_name, &[], now)
        {
            Ok(_) => Ok(()),
            // webpki checks the name only after the chain verified; pinned
            // endpoints are matched on common name instead of SAN
            Err(rustls::Error::InvalidCertificate(ref err)) if is_name_mismatch(err) => Ok(()),
            Err(e) => Err(TlsError::ChainValidation(e.to_string())),
        }
    }

    fn common_name(&self, end_entity: &CertificateDer<'_>) -> Result<Option<String>, TlsError> {
        subject_common_name(end_entity.as_ref())
    }
}

fn is_name_mismatch(err: &CertificateError) -> bool {
    matches!(
        err,
        CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. }
    )
}

/// Decides whether a peer presenting a given chain is trusted for one
/// (hostname, common name) pair.
#[derive(Debug)]
pub struct PinnedTrustValidator<B = WebPkiBackend> {
    backend: B,
    request_hostname: String,
    expected_common_name: String,
}

impl<B: TrustBackend> PinnedTrustValidator<B> {
    pub fn new(
        backend: B,
        request_hostname: impl Into<String>,
        expected_common_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            request_hostname: request_hostname.into(),
            expected_common_name: expected_common_name.into(),
        }
    }

    #[must_use]
    pub fn request_hostname(&self) -> &str {
        &self.request_hostname
    }

    #[must_use]
    pub fn expected_common_name(&self) -> &str {
        &self.expected_common_name
    }

    /// Accept or reject the peer. Never accepts on error.
    pub fn validate(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> bool {
        match catch_unwind(AssertUnwindSafe(|| {
            self.evaluate(end_entity, intermediates, server_name, now)
        })) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(
                    "Rejecting pinned peer for {}: {}",
                    self.request_hostname,
                    e
                );
                false
            }
            Err(_) => {
                tracing::error!(
                    "Trust backend panicked while validating {}; rejecting peer",
                    self.request_hostname
                );
                false
            }
        }
    }

    fn evaluate(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        now: UnixTime,
    ) -> Result<(), TlsError> {
        self.backend
            .evaluate_chain(end_entity, intermediates, server_name, now)?;

        let common_name = self.backend.common_name(end_entity)?.ok_or_else(|| {
            TlsError::PeerVerification("Peer certificate has no common name".to_string())
        })?;

        let observed_hostname = server_name_to_string(server_name).ok_or_else(|| {
            TlsError::PeerVerification("Unsupported server name type".to_string())
        })?;

        // evaluate both before combining so neither result short-circuits
        let hostname_matches = salted_str_eq(
            &observed_hostname.to_ascii_lowercase(),
            &self.request_hostname.to_ascii_lowercase(),
        );
        let common_name_matches = salted_str_eq(&common_name, &self.expected_common_name);

        if hostname_matches & common_name_matches {
            Ok(())
        } else {
            Err(TlsError::PeerVerification(
                "Hostname or common name does not match the pinned values".to_string(),
            ))
        }
    }
}

fn server_name_to_string(server_name: &ServerName<'_>) -> Option<String> {
    match server_name {
        ServerName::DnsName(name) => Some(name.as_ref().to_string()),
        ServerName::IpAddress(ip) => Some(std::net::IpAddr::from(*ip).to_string()),
        _ => None,
    }
}

/// rustls verifier that delegates peer trust to a [`PinnedTrustValidator`].
///
/// A rejection is returned as a certificate error, which aborts the
/// handshake.
#[derive(Debug)]
pub struct PinnedCertVerifier<B = WebPkiBackend> {
    validator: PinnedTrustValidator<B>,
    provider: Arc<CryptoProvider>,
}

impl<B: TrustBackend> PinnedCertVerifier<B> {
    pub fn new(validator: PinnedTrustValidator<B>, provider: Arc<CryptoProvider>) -> Self {
        Self {
            validator,
            provider,
        }
    }
}

impl<B: TrustBackend> ServerCertVerifier for PinnedCertVerifier<B> {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        if self
            .validator
            .validate(end_entity, intermediates, server_name, now)
        {
            tracing::debug!("Pinned certificate accepted for {:?}", server_name);
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

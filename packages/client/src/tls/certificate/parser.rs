//! Certificate decoding: PEM blocks and subject attributes

use der::Decode;
use rustls::pki_types::CertificateDer;
use x509_cert::Certificate as X509CertCert;

use super::super::errors::TlsError;

/// Decode every `CERTIFICATE` block in a PEM document.
pub fn certificates_from_pem(pem_data: &str) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut pem_data.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TlsError::CertificateParsing(format!("Invalid PEM data: {e}")))?;

    if certs.is_empty() {
        return Err(TlsError::CertificateParsing(
            "No certificate found in PEM data".to_string(),
        ));
    }
    Ok(certs)
}

/// Decode the first `CERTIFICATE` block in a PEM document.
pub fn certificate_from_pem(pem_data: &str) -> Result<CertificateDer<'static>, TlsError> {
    let mut certs = certificates_from_pem(pem_data)?;
    Ok(certs.swap_remove(0))
}

/// Subject common name of a DER certificate, if present.
///
/// The first `commonName` (2.5.4.3) attribute in RDN order is returned.
pub fn subject_common_name(cert_der: &[u8]) -> Result<Option<String>, TlsError> {
    use der::asn1::{Ia5StringRef, PrintableStringRef, Utf8StringRef};

    const OID_CN: &str = "2.5.4.3";

    let cert = X509CertCert::from_der(cert_der)
        .map_err(|e| TlsError::CertificateParsing(format!("Invalid DER certificate: {e}")))?;

    let common_name = cert
        .tbs_certificate
        .subject
        .0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .filter(|atv| atv.oid.to_string() == OID_CN)
        .find_map(|atv| {
            if let Ok(value) = Utf8StringRef::try_from(&atv.value) {
                Some(value.to_string())
            } else if let Ok(value) = PrintableStringRef::try_from(&atv.value) {
                Some(value.to_string())
            } else {
                Ia5StringRef::try_from(&atv.value).ok().map(|value| value.to_string())
            }
        });
    Ok(common_name)
}

//! HTTPS transport over tokio, rustls and hyper's HTTP/1.1 client

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use http_body_util::BodyExt;
use hyper_util::rt::TokioIo;
use rustls::ClientConfig;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use url::Host;

use super::error::TransportError;
use super::transport::{PinnedTrust, ReportTransport, TransportFactory};
use crate::config::REQUEST_TIMEOUT;
use crate::http::{RawResponse, ReportRequest};
use crate::tls::TlsManager;

/// One-shot HTTPS client: a fresh connection per request, bounded by a
/// fixed overall timeout.
pub struct HttpsTransport {
    tls: Arc<ClientConfig>,
    timeout: Duration,
}

impl HttpsTransport {
    pub fn new(tls: ClientConfig, timeout: Duration) -> Self {
        Self {
            tls: Arc::new(tls),
            timeout,
        }
    }

    async fn exchange(&self, request: ReportRequest) -> Result<RawResponse, TransportError> {
        let url = &request.url;
        let port = url.port_or_known_default().unwrap_or(443);
        let (host, server_name) = match url.host() {
            Some(Host::Domain(domain)) => {
                let server_name = ServerName::try_from(domain.to_string())
                    .map_err(|e| TransportError::InvalidUrl(format!("{domain}: {e}")))?;
                (domain.to_string(), server_name)
            }
            Some(Host::Ipv4(ip)) => (ip.to_string(), ServerName::from(std::net::IpAddr::V4(ip))),
            Some(Host::Ipv6(ip)) => (ip.to_string(), ServerName::from(std::net::IpAddr::V6(ip))),
            None => return Err(TransportError::InvalidUrl(format!("{url} has no host"))),
        };

        let tcp_stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|source| TransportError::Connect {
                host: host.clone(),
                port,
                source,
            })?;

        let tls_stream = TlsConnector::from(self.tls.clone())
            .connect(server_name, tcp_stream)
            .await
            .map_err(TransportError::Handshake)?;

        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(tls_stream)).await?;

        // Spawn connection driver
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!("Report connection closed with error: {}", e);
            }
        });

        let http_request = request.to_http()?;
        let response = sender.send_request(http_request).await?;
        let status = response.status();

        let body = response
            .into_body()
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(TransportError::Body);

        Ok(RawResponse { status, body })
    }
}

impl ReportTransport for HttpsTransport {
    fn post(&self, request: ReportRequest) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            tracing::debug!("POST {}", request.url);
            tokio::time::timeout(self.timeout, self.exchange(request))
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))?
        })
    }
}

/// Factory producing [`HttpsTransport`]s, bounded by [`REQUEST_TIMEOUT`]
/// unless overridden.
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    tls_manager: TlsManager,
    timeout: Duration,
}

impl Default for HttpTransportFactory {
    fn default() -> Self {
        Self {
            tls_manager: TlsManager::new(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl HttpTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tls_manager(tls_manager: TlsManager) -> Self {
        Self {
            tls_manager,
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TransportFactory for HttpTransportFactory {
    fn transport(
        &self,
        pin: Option<PinnedTrust<'_>>,
    ) -> Result<Arc<dyn ReportTransport>, TransportError> {
        let tls = match pin {
            None => self.tls_manager.default_client_config()?,
            Some(pin) => self.tls_manager.pinned_client_config(
                pin.certificate_pem,
                pin.hostname,
                pin.common_name,
            )?,
        };
        Ok(Arc::new(HttpsTransport::new(tls, self.timeout)))
    }
}

//! Reporter facade

use std::sync::Arc;

use diagreport_client::connect::{HttpTransportFactory, TransportFactory};
use diagreport_client::report::{ReportSender, SendOutcome};
use diagreport_client::{ErrorKind, RequestError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::{ConfigResult, ReporterConfig};

/// Sends diagnostic reports for one validated configuration.
#[derive(Clone)]
pub struct Reporter {
    sender: ReportSender,
}

impl Reporter {
    /// Validate `config` and build a reporter using HTTPS transports.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigurationError` raised by [`ReporterConfig::validate`].
    pub fn new(config: ReporterConfig) -> ConfigResult<Self> {
        Self::with_transport(config, Arc::new(HttpTransportFactory::new()))
    }

    /// Like [`new`](Self::new) with a caller-supplied transport factory.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigurationError` raised by [`ReporterConfig::validate`].
    pub fn with_transport(
        config: ReporterConfig,
        factory: Arc<dyn TransportFactory>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        log::debug!(
            "Reporter configured for team '{}' with {} provider(s)",
            config.team_identifier,
            config.log_providers.len()
        );

        let sender = ReportSender::new(factory, config.endpoints)
            .team_identifier(config.team_identifier)
            .app_version(config.app_version)
            .certificate(config.certificate.as_deref())
            .providers(config.log_providers);

        Ok(Reporter { sender })
    }

    /// Submit one report and wait for the outcome.
    pub async fn send(&self, should_send_persisted_data: bool) -> SendOutcome {
        self.sender.send(should_send_persisted_data).await
    }

    /// Submit one report on the current tokio runtime and hand the
    /// identifier and errors to `callback` when done.
    ///
    /// Outside a tokio runtime nothing is sent: `callback` runs at once with
    /// a single fatal `InvalidClientState` error and `None` is returned.
    pub fn send_with_callback<F>(
        &self,
        should_send_persisted_data: bool,
        callback: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Option<String>, Vec<RequestError>) + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!("Cannot send report: {e}");
                callback(
                    None,
                    vec![
                        RequestError::new(
                            ErrorKind::InvalidClientState,
                            "No async runtime available to send the report",
                        )
                        .fatal(),
                    ],
                );
                return None;
            }
        };

        let sender = self.sender.clone();
        Some(runtime.spawn(async move {
            let outcome = sender.send(should_send_persisted_data).await;
            if !outcome.errors.is_empty() {
                log::warn!("Report finished with {} error(s)", outcome.errors.len());
            }
            callback(outcome.report_identifier, outcome.errors);
        }))
    }
}

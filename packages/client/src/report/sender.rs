//! Report orchestrator: create, populate concurrently, then finish

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::task::JoinError;

use super::endpoint::{Endpoint, EndpointProvider};
use super::fallback::{FallbackContext, run_with_fallback};
use super::phases::{AddAttachment, CreateReport, FinishReport};
use super::provider::{LogProvider, provider_context};
use crate::connect::TransportFactory;
use crate::error::{self, RequestError};

/// What one `send` produced: the report identifier, if the report was
/// created, and every error recorded along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOutcome {
    pub report_identifier: Option<String>,
    pub errors: Vec<RequestError>,
}

impl SendOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.report_identifier.is_some() && self.errors.is_empty()
    }
}

/// Drives the full report lifecycle against an ordered endpoint list.
///
/// Holds no per-report state; every `send` starts from scratch.
#[derive(Clone)]
pub struct ReportSender {
    factory: Arc<dyn TransportFactory>,
    endpoints: Arc<dyn EndpointProvider>,
    providers: Vec<Arc<dyn LogProvider>>,
    certificate: Option<Arc<str>>,
    team_identifier: String,
    app_version: String,
}

impl ReportSender {
    pub fn new(factory: Arc<dyn TransportFactory>, endpoints: Arc<dyn EndpointProvider>) -> Self {
        ReportSender {
            factory,
            endpoints,
            providers: Vec::new(),
            certificate: None,
            team_identifier: String::new(),
            app_version: String::new(),
        }
    }

    #[must_use]
    pub fn team_identifier(mut self, team_identifier: impl Into<String>) -> Self {
        self.team_identifier = team_identifier.into();
        self
    }

    #[must_use]
    pub fn app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = app_version.into();
        self
    }

    /// PEM certificate used as trust anchor for pinned endpoints.
    #[must_use]
    pub fn certificate(mut self, certificate_pem: Option<&str>) -> Self {
        self.certificate = certificate_pem.map(Arc::from);
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LogProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    #[must_use]
    pub fn providers(mut self, providers: impl IntoIterator<Item = Arc<dyn LogProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Run create, populate and finish once.
    ///
    /// Persisted-data providers are only uploaded when
    /// `should_send_persisted_data` is set.
    pub async fn send(&self, should_send_persisted_data: bool) -> SendOutcome {
        let endpoints: Arc<[Endpoint]> = self.endpoints.endpoints().into();
        let mut errors = Vec::new();

        let create = CreateReport::new(&self.app_version, self.team_identifier.as_str());
        let created = run_with_fallback(&create, self.context(&endpoints, None)).await;
        errors.extend(created.errors);

        let Some(report_identifier) = created.value else {
            tracing::warn!(
                "Report creation failed on all {} endpoint(s)",
                endpoints.len()
            );
            return SendOutcome {
                report_identifier: None,
                errors,
            };
        };
        tracing::info!("Created report {}", report_identifier);

        errors.extend(
            self.populate(&report_identifier, &endpoints, should_send_persisted_data)
                .await,
        );

        let finish = FinishReport::new(&report_identifier);
        let finished = run_with_fallback(&finish, self.context(&endpoints, None)).await;
        errors.extend(finished.errors);

        tracing::debug!(
            "Report {} sent with {} error(s)",
            report_identifier,
            errors.len()
        );
        SendOutcome {
            report_identifier: Some(report_identifier),
            errors,
        }
    }

    fn context<'a>(
        &'a self,
        endpoints: &'a [Endpoint],
        provider: Option<&'a str>,
    ) -> FallbackContext<'a> {
        FallbackContext {
            endpoints,
            certificate: self.certificate.as_deref(),
            factory: self.factory.as_ref(),
            provider,
        }
    }

    async fn populate(
        &self,
        report_identifier: &str,
        endpoints: &Arc<[Endpoint]>,
        should_send_persisted_data: bool,
    ) -> Vec<RequestError> {
        let mut tasks = Vec::new();

        for provider in &self.providers {
            // provider accessors may panic; only guarded calls run here
            let context =
                catch_unwind(AssertUnwindSafe(|| provider_context(provider.as_ref()))).ok();

            let provider = Arc::clone(provider);
            let report_identifier = report_identifier.to_string();
            let factory = Arc::clone(&self.factory);
            let endpoints = Arc::clone(endpoints);
            let certificate = self.certificate.clone();
            let task_context = context.clone();

            let handle = tokio::spawn(async move {
                let Some(phase) =
                    attachment(provider.as_ref(), &report_identifier, should_send_persisted_data)
                else {
                    return Vec::new();
                };
                let ctx = FallbackContext {
                    endpoints: &endpoints,
                    certificate: certificate.as_deref(),
                    factory: factory.as_ref(),
                    provider: task_context.as_deref(),
                };
                run_with_fallback(&phase, ctx).await.errors
            });
            tasks.push((context, handle));
        }

        let mut errors = Vec::new();
        for (context, handle) in tasks {
            match handle.await {
                Ok(task_errors) => errors.extend(task_errors),
                Err(join_error) => {
                    errors.push(join_failure(join_error).with_provider(context.as_deref()));
                }
            }
        }
        errors
    }
}

/// The upload for `provider`, or `None` when it is skipped.
fn attachment(
    provider: &dyn LogProvider,
    report_identifier: &str,
    should_send_persisted_data: bool,
) -> Option<AddAttachment> {
    if provider.is_persisted_data() && !should_send_persisted_data {
        tracing::debug!("Skipping persisted provider '{}'", provider.kind());
        return None;
    }
    let Some(filename) = provider.filename().filter(|f| !f.trim().is_empty()) else {
        tracing::debug!("Skipping provider '{}' without filename", provider.kind());
        return None;
    };
    let Some(value) = provider.value().filter(|v| !v.trim().is_empty()) else {
        tracing::debug!("Skipping provider '{}' without value", provider.kind());
        return None;
    };

    Some(AddAttachment::new(
        report_identifier,
        &filename,
        provider.report_category().as_str(),
        &value,
    ))
}

fn join_failure(join_error: JoinError) -> RequestError {
    if join_error.is_panic() {
        let payload = join_error.into_panic();
        error::panicked(payload.as_ref())
    } else {
        error::cancelled()
    }
}

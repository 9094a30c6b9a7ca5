//! Ordered endpoint fallback shared by every phase

use super::endpoint::Endpoint;
use super::phases::Phase;
use crate::connect::{PinnedTrust, TransportFactory};
use crate::error::{self, RequestError};
use crate::http::is_error_status;

/// Result of running one phase across the endpoint list.
#[derive(Debug)]
pub struct PhaseOutcome<T> {
    /// Output of the first endpoint that succeeded.
    pub value: Option<T>,
    /// One entry per failed attempt, in endpoint order.
    pub errors: Vec<RequestError>,
}

impl<T> PhaseOutcome<T> {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

/// Inputs shared by every attempt of one phase.
#[derive(Clone, Copy)]
pub struct FallbackContext<'a> {
    pub endpoints: &'a [Endpoint],
    pub certificate: Option<&'a str>,
    pub factory: &'a dyn TransportFactory,
    /// Provider attribution for populate attempts.
    pub provider: Option<&'a str>,
}

/// Try `phase` against each endpoint in order, stopping at the first success.
///
/// Every failure is recorded with its endpoint and provider context; nothing
/// is raised past this loop.
pub async fn run_with_fallback<P: Phase>(
    phase: &P,
    ctx: FallbackContext<'_>,
) -> PhaseOutcome<P::Output> {
    let mut errors = Vec::new();

    if ctx.endpoints.is_empty() {
        errors.push(error::no_endpoints().with_provider(ctx.provider));
        return PhaseOutcome {
            value: None,
            errors,
        };
    }

    for endpoint in ctx.endpoints {
        match attempt(phase, endpoint, &ctx).await {
            Ok(value) => {
                tracing::debug!("Phase '{}' succeeded on {}", phase.name(), endpoint.address);
                return PhaseOutcome {
                    value: Some(value),
                    errors,
                };
            }
            Err(err) => {
                let err = err.with_endpoint(endpoint).with_provider(ctx.provider);
                tracing::warn!("Phase '{}' failed: {}", phase.name(), err);
                errors.push(err);
            }
        }
    }

    PhaseOutcome {
        value: None,
        errors,
    }
}

async fn attempt<P: Phase>(
    phase: &P,
    endpoint: &Endpoint,
    ctx: &FallbackContext<'_>,
) -> Result<P::Output, RequestError> {
    let pin = if endpoint.use_pinned_certificate {
        let certificate_pem = ctx
            .certificate
            .filter(|pem| !pem.trim().is_empty())
            .ok_or_else(error::missing_certificate)?;
        let common_name = endpoint.common_name().ok_or_else(error::missing_common_name)?;
        Some(PinnedTrust {
            certificate_pem,
            hostname: endpoint.hostname(),
            common_name,
        })
    } else {
        None
    };

    let transport = ctx.factory.transport(pin).map_err(|e| error::engine(&e))?;
    let request = phase.request(endpoint).map_err(|e| error::engine(&e))?;
    let response = transport
        .post(request)
        .await
        .map_err(|e| error::engine(&e))?;

    if is_error_status(response.status.as_u16()) {
        return Err(error::status_code(response.status));
    }

    phase.interpret(response.body)
}

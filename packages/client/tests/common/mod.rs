//! Scripted transport factory shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use diagreport_client::connect::{PinnedTrust, ReportTransport, TransportError, TransportFactory};
use diagreport_client::http::{RawResponse, ReportRequest, RequestBody};
use futures::future::BoxFuture;
use http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Create,
    Add,
    Finish,
}

impl PhaseKind {
    fn of(request: &ReportRequest) -> PhaseKind {
        let path = request.url.path();
        if path.ends_with("/create") {
            PhaseKind::Create
        } else if path.ends_with("/add") {
            PhaseKind::Add
        } else {
            PhaseKind::Finish
        }
    }
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Respond(u16, &'static str),
    TransportFailure,
    BodyFailure,
    Panic,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub host: String,
    pub phase: PhaseKind,
    pub url: String,
    pub body: RequestBody,
    pub pinned: bool,
}

#[derive(Debug, Clone)]
pub struct RecordedPin {
    pub certificate_pem: String,
    pub hostname: String,
    pub common_name: String,
}

#[derive(Default)]
struct State {
    script: HashMap<(String, PhaseKind), Behavior>,
    failing_factory: bool,
    calls: Vec<RecordedCall>,
    pins: Vec<RecordedPin>,
}

/// Transport factory answering from a per-(host, phase) script.
/// Unscripted requests get `404`.
#[derive(Clone, Default)]
pub struct MockFactory {
    state: Arc<Mutex<State>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, host: &str, phase: PhaseKind, behavior: Behavior) -> &Self {
        self.state
            .lock()
            .unwrap()
            .script
            .insert((host.to_string(), phase), behavior);
        self
    }

    pub fn fail_construction(&self) {
        self.state.lock().unwrap().failing_factory = true;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, phase: PhaseKind) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.phase == phase).collect()
    }

    pub fn pins(&self) -> Vec<RecordedPin> {
        self.state.lock().unwrap().pins.clone()
    }
}

impl TransportFactory for MockFactory {
    fn transport(
        &self,
        pin: Option<PinnedTrust<'_>>,
    ) -> Result<Arc<dyn ReportTransport>, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_factory {
            return Err(TransportError::Other("factory unavailable".to_string()));
        }
        if let Some(pin) = pin {
            state.pins.push(RecordedPin {
                certificate_pem: pin.certificate_pem.to_string(),
                hostname: pin.hostname.to_string(),
                common_name: pin.common_name.to_string(),
            });
        }
        Ok(Arc::new(MockTransport {
            state: Arc::clone(&self.state),
            pinned: pin.is_some(),
        }))
    }
}

struct MockTransport {
    state: Arc<Mutex<State>>,
    pinned: bool,
}

impl ReportTransport for MockTransport {
    fn post(&self, request: ReportRequest) -> BoxFuture<'_, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            let phase = PhaseKind::of(&request);
            let host = request.url.host_str().unwrap_or_default().to_string();

            let behavior = {
                let mut state = self.state.lock().unwrap();
                state.calls.push(RecordedCall {
                    host: host.clone(),
                    phase,
                    url: request.url.to_string(),
                    body: request.body.clone(),
                    pinned: self.pinned,
                });
                state.script.get(&(host, phase)).cloned()
            };

            tokio::task::yield_now().await;

            match behavior {
                Some(Behavior::Respond(code, body)) => Ok(RawResponse::new(
                    StatusCode::from_u16(code).unwrap(),
                    Bytes::from_static(body.as_bytes()),
                )),
                Some(Behavior::TransportFailure) => Err(TransportError::Other(
                    "connection reset by peer".to_string(),
                )),
                Some(Behavior::BodyFailure) => Ok(RawResponse {
                    status: StatusCode::OK,
                    body: Err(TransportError::Other("body truncated".to_string())),
                }),
                Some(Behavior::Panic) => panic!("transport exploded"),
                None => Ok(RawResponse::new(StatusCode::NOT_FOUND, Bytes::new())),
            }
        })
    }
}

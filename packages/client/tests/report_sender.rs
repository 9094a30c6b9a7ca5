mod common;

use std::sync::Arc;

use common::{Behavior, MockFactory, PhaseKind};
use diagreport_client::error::ErrorKind;
use diagreport_client::http::RequestBody;
use diagreport_client::report::{
    Endpoint, LogProvider, ProviderKind, ReportCategory, ReportSender, StaticLogProvider,
};

const CREATED: Behavior = Behavior::Respond(200, r#"{"code":"R123"}"#);
const OK: Behavior = Behavior::Respond(200, "");

fn sender(factory: &MockFactory, endpoints: Vec<Endpoint>) -> ReportSender {
    ReportSender::new(Arc::new(factory.clone()), Arc::new(endpoints))
        .team_identifier("team-a")
        .app_version("3.1.0")
}

fn provider(kind: ProviderKind, filename: &str, value: &str) -> Arc<dyn LogProvider> {
    Arc::new(StaticLogProvider::new(
        kind,
        filename,
        ReportCategory::Diagnostic,
        value,
    ))
}

#[tokio::test]
async fn test_first_successful_endpoint_short_circuits() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Finish, OK);

    let outcome = sender(
        &factory,
        vec![Endpoint::new("a.example"), Endpoint::new("b.example")],
    )
    .send(false)
    .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert!(factory.calls().iter().all(|c| c.host == "a.example"));
}

#[tokio::test]
async fn test_create_falls_back_to_next_endpoint() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, Behavior::Respond(503, ""))
        .on("b.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Finish, OK);

    let outcome = sender(
        &factory,
        vec![Endpoint::new("a.example"), Endpoint::new("b.example")],
    )
    .send(false)
    .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert_eq!(outcome.errors.len(), 1);

    let error = &outcome.errors[0];
    assert_eq!(error.kind, ErrorKind::UnsuccessfulRequest);
    assert_eq!(error.message.as_deref(), Some("(503) Service Unavailable"));
    assert_eq!(
        error.endpoint_context.as_ref().map(|e| e.address.as_str()),
        Some("a.example")
    );
    assert!(error.provider_context.is_none());
}

#[tokio::test]
async fn test_create_failure_everywhere_abandons_report() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, Behavior::TransportFailure)
        .on("b.example", PhaseKind::Create, Behavior::Respond(302, ""))
        .on("c.example", PhaseKind::Create, Behavior::Respond(200, "{}"));

    let outcome = sender(
        &factory,
        vec![
            Endpoint::new("a.example"),
            Endpoint::new("b.example"),
            Endpoint::new("c.example"),
        ],
    )
    .provider(provider(ProviderKind::AppInfo, "app", "v"))
    .send(false)
    .await;

    assert_eq!(outcome.report_identifier, None);
    let kinds: Vec<ErrorKind> = outcome.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::HttpEngine,
            ErrorKind::UnsuccessfulRequest,
            ErrorKind::SerializingResponse,
        ]
    );
    assert!(factory.calls_for(PhaseKind::Add).is_empty());
    assert!(factory.calls_for(PhaseKind::Finish).is_empty());
}

#[tokio::test]
async fn test_unreadable_create_body_is_reading_error() {
    let factory = MockFactory::new();
    factory.on("a.example", PhaseKind::Create, Behavior::BodyFailure);

    let outcome = sender(&factory, vec![Endpoint::new("a.example")])
        .send(false)
        .await;

    assert_eq!(outcome.report_identifier, None);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].kind, ErrorKind::ReadingResponse);
}

#[tokio::test]
async fn test_empty_endpoint_list_is_fatal() {
    let factory = MockFactory::new();
    let outcome = sender(&factory, Vec::new()).send(true).await;

    assert_eq!(outcome.report_identifier, None);
    assert_eq!(outcome.errors.len(), 1);
    let error = &outcome.errors[0];
    assert!(error.is_fatal);
    assert_eq!(error.kind, ErrorKind::InvalidClientState);
    assert_eq!(
        error.message.as_deref(),
        Some("No available endpoints to perform the request")
    );
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn test_skipped_provider_makes_no_request() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Add, OK)
        .on("a.example", PhaseKind::Finish, OK);

    let outcome = sender(&factory, vec![Endpoint::new("a.example")])
        .provider(provider(ProviderKind::AppInfo, "app_info", "build 7"))
        .provider(provider(ProviderKind::RegionInfo, "region", "   "))
        .provider(provider(ProviderKind::DeviceInfo, "device", "pixel"))
        .provider(provider(ProviderKind::ProtocolInfo, "", "wireguard"))
        .send(false)
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.errors);
    let adds = factory.calls_for(PhaseKind::Add);
    assert_eq!(adds.len(), 2);

    let mut names: Vec<String> = adds
        .iter()
        .map(|c| match &c.body {
            RequestBody::Multipart(part) => part.name.clone(),
            RequestBody::Empty => panic!("add request without body"),
        })
        .collect();
    names.sort();
    assert_eq!(names, vec!["app_info", "device"]);
}

#[tokio::test]
async fn test_persisted_providers_require_opt_in() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Add, OK)
        .on("a.example", PhaseKind::Finish, OK);

    let persisted: Arc<dyn LogProvider> = Arc::new(
        StaticLogProvider::new(
            ProviderKind::UserSettings,
            "user_settings",
            ReportCategory::Diagnostic,
            "\nregion: us",
        )
        .persisted(),
    );

    let sender = sender(&factory, vec![Endpoint::new("a.example")]).provider(persisted);

    sender.send(false).await;
    assert!(factory.calls_for(PhaseKind::Add).is_empty());

    sender.send(true).await;
    assert_eq!(factory.calls_for(PhaseKind::Add).len(), 1);
}

#[tokio::test]
async fn test_populate_failure_is_attributed_and_close_still_runs() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Add, Behavior::Respond(500, ""))
        .on("a.example", PhaseKind::Finish, OK);

    let crash: Arc<dyn LogProvider> = Arc::new(StaticLogProvider::new(
        ProviderKind::LastKnownException,
        "crash",
        ReportCategory::Crash,
        "trace",
    ));

    let outcome = sender(&factory, vec![Endpoint::new("a.example")])
        .provider(crash)
        .send(false)
        .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].provider_context.as_deref(),
        Some("provider for 'Last Known Exception' (filename: crash, report: crash)")
    );
    assert_eq!(factory.calls_for(PhaseKind::Finish).len(), 1);
}

#[tokio::test]
async fn test_panicking_upload_does_not_abort_siblings() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Add, Behavior::Panic)
        .on("a.example", PhaseKind::Finish, OK);

    let outcome = sender(&factory, vec![Endpoint::new("a.example")])
        .provider(provider(ProviderKind::AppInfo, "app", "1"))
        .provider(provider(ProviderKind::DeviceInfo, "device", "2"))
        .send(false)
        .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert_eq!(outcome.errors.len(), 2);
    for error in &outcome.errors {
        assert_eq!(error.kind, ErrorKind::UnsuccessfulRequest);
        assert_eq!(error.message.as_deref(), Some("transport exploded"));
        assert!(error.provider_context.is_some());
    }
    assert_eq!(factory.calls_for(PhaseKind::Finish).len(), 1);
}

#[tokio::test]
async fn test_close_failure_keeps_identifier() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Finish, Behavior::Respond(404, ""))
        .on("b.example", PhaseKind::Finish, Behavior::Respond(600, ""));

    let outcome = sender(
        &factory,
        vec![Endpoint::new("a.example"), Endpoint::new("b.example")],
    )
    .send(false)
    .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert_eq!(outcome.errors.len(), 2);
    assert!(
        outcome
            .errors
            .iter()
            .all(|e| e.kind == ErrorKind::UnsuccessfulRequest && !e.is_fatal)
    );
}

#[tokio::test]
async fn test_factory_failure_is_engine_error() {
    let factory = MockFactory::new();
    factory.fail_construction();

    let outcome = sender(&factory, vec![Endpoint::new("a.example")])
        .send(false)
        .await;

    assert_eq!(outcome.errors.len(), 1);
    let error = &outcome.errors[0];
    assert_eq!(error.kind, ErrorKind::HttpEngine);
    let exception = error.exception.as_ref().unwrap();
    assert_eq!(exception.class_name, "TransportError");
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn test_pinned_endpoint_without_certificate_is_skipped() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Finish, OK);

    let outcome = sender(
        &factory,
        vec![
            Endpoint::pinned("pinned.example", "reports"),
            Endpoint::new("a.example"),
        ],
    )
    .send(false)
    .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    // create and finish both try the pinned endpoint first
    assert_eq!(outcome.errors.len(), 2);
    for error in &outcome.errors {
        assert_eq!(error.kind, ErrorKind::InvalidClientState);
        assert!(!error.is_fatal);
    }
    assert!(factory.calls().iter().all(|c| c.host == "a.example"));
}

#[tokio::test]
async fn test_pinned_endpoint_without_common_name_is_skipped() {
    let factory = MockFactory::new();
    let mut endpoint = Endpoint::pinned("pinned.example", "");
    endpoint.pinned_common_name = None;

    let outcome = sender(&factory, vec![endpoint])
        .certificate(Some("-----BEGIN CERTIFICATE-----"))
        .send(false)
        .await;

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].kind, ErrorKind::InvalidClientState);
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn test_pinned_attempt_passes_hostname_and_common_name() {
    let factory = MockFactory::new();
    factory
        .on("pinned.example", PhaseKind::Create, CREATED)
        .on("pinned.example", PhaseKind::Finish, OK);

    let outcome = sender(&factory, vec![Endpoint::pinned("pinned.example:8443", "reports")])
        .certificate(Some("PEM"))
        .send(false)
        .await;

    assert!(outcome.is_success(), "{:?}", outcome.errors);
    let pins = factory.pins();
    assert_eq!(pins.len(), 2);
    assert_eq!(pins[0].hostname, "pinned.example");
    assert_eq!(pins[0].common_name, "reports");
    assert_eq!(pins[0].certificate_pem, "PEM");
    assert!(factory.calls().iter().all(|c| c.pinned));
}

#[tokio::test]
async fn test_end_to_end_with_untrusted_pinned_fallback() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Add, OK)
        .on("a.example", PhaseKind::Finish, OK)
        .on("b.example", PhaseKind::Create, Behavior::TransportFailure)
        .on("b.example", PhaseKind::Finish, Behavior::TransportFailure);

    let outcome = sender(
        &factory,
        vec![
            Endpoint::new("a.example"),
            Endpoint::pinned("b.example", "reports.example"),
        ],
    )
    .certificate(Some("PEM"))
    .provider(provider(ProviderKind::AppInfo, "app_info", "build 7"))
    .send(false)
    .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);

    let finishes = factory.calls_for(PhaseKind::Finish);
    assert_eq!(finishes.len(), 1);
    assert_eq!(finishes[0].host, "a.example");
    assert_eq!(finishes[0].url, "https://a.example/api/v2/report/R123/finish");

    let adds = factory.calls_for(PhaseKind::Add);
    assert_eq!(adds[0].url, "https://a.example/api/v2/report/R123/add");
    match &adds[0].body {
        RequestBody::Multipart(part) => {
            assert_eq!(part.value, "/PIA_PART/app_info.diagnostic\nbuild 7");
        }
        RequestBody::Empty => panic!("add request without body"),
    }
    assert!(factory.calls().iter().all(|c| c.host == "a.example"));
}

struct FailingValueProvider;

impl LogProvider for FailingValueProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DeviceInfo
    }

    fn is_persisted_data(&self) -> bool {
        false
    }

    fn filename(&self) -> Option<String> {
        Some("device".to_string())
    }

    fn report_category(&self) -> ReportCategory {
        ReportCategory::Diagnostic
    }

    fn value(&self) -> Option<String> {
        panic!("device info unavailable")
    }
}

#[tokio::test]
async fn test_panicking_provider_value_is_recorded() {
    let factory = MockFactory::new();
    factory
        .on("a.example", PhaseKind::Create, CREATED)
        .on("a.example", PhaseKind::Add, OK)
        .on("a.example", PhaseKind::Finish, OK);

    let outcome = sender(&factory, vec![Endpoint::new("a.example")])
        .provider(Arc::new(FailingValueProvider))
        .provider(provider(ProviderKind::AppInfo, "app_info", "build 7"))
        .send(false)
        .await;

    assert_eq!(outcome.report_identifier.as_deref(), Some("R123"));
    assert_eq!(outcome.errors.len(), 1);
    let error = &outcome.errors[0];
    assert_eq!(error.kind, ErrorKind::UnsuccessfulRequest);
    assert_eq!(error.message.as_deref(), Some("device info unavailable"));
    assert_eq!(
        error.provider_context.as_deref(),
        Some("provider for 'Device Information' (filename: device, report: diagnostic)")
    );
    assert_eq!(factory.calls_for(PhaseKind::Add).len(), 1);
    assert_eq!(factory.calls_for(PhaseKind::Finish).len(), 1);
}

#[tokio::test]
async fn test_blank_certificate_counts_as_missing() {
    let factory = MockFactory::new();

    let outcome = sender(&factory, vec![Endpoint::pinned("pinned.example", "reports")])
        .certificate(Some("  "))
        .send(false)
        .await;

    assert_eq!(outcome.report_identifier, None);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].kind, ErrorKind::InvalidClientState);
    assert_eq!(
        outcome.errors[0].message.as_deref(),
        Some("No available certificate for pinning purposes")
    );
    assert!(factory.pins().is_empty());
    assert!(factory.calls().is_empty());
}

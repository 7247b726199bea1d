//! End-to-end `StubTransport` tests against a full `Client`, covering the
//! interception surfaces not already exercised by the component's own
//! `src/*.rs` unit tests: ignore rules, `optin` pass-through, dynamic stub
//! responses, and the scoped-guard lifecycle.

use http_client::{Client, ClientConfig};
use http_errors::HttpResult;
use http_loader::Loader;
use http_stub::{Matcher, Stub, StubBody, StubResponse, Stubber, UnhandledMode};
use http_transport::{Transport, TransportResponse, TransportTask};
use http_types::RequestBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

struct CountingRealTransport {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Transport for CountingRealTransport {
    async fn execute(&self, _task: TransportTask) -> HttpResult<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TransportResponse {
            status: http::StatusCode::OK,
            headers: http::HeaderMap::new(),
            body: Box::pin(futures::stream::once(async { Ok(bytes::Bytes::from_static(b"real")) })),
        })
    }
}

#[tokio::test]
async fn ignore_rule_passes_through_to_the_fallback_transport() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register_ignore_rule(Stub::new().matching(Matcher::url_regex("^http://local/health$").unwrap()))
        .await;

    let real = Arc::new(CountingRealTransport {
        calls: AtomicUsize::new(0),
    });
    let transport = http_stub::StubTransport::with_fallback(stubber, real.clone());
    let loader = Loader::new(Arc::new(transport));

    let request = RequestBuilder::to_path(http::Method::GET, "/health").build().unwrap();
    let url = Url::parse("http://local/health").unwrap();
    let response = loader
        .execute(&request, &url, &http_types::SecurityPolicy::Default, None)
        .await;

    assert!(!response.is_error());
    assert_eq!(response.data.bytes().unwrap().as_ref(), b"real");
    assert_eq!(real.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn optin_mode_passes_unmatched_requests_through() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber.set_unhandled_mode(UnhandledMode::OptIn).await;

    let real = Arc::new(CountingRealTransport {
        calls: AtomicUsize::new(0),
    });
    let transport = http_stub::StubTransport::with_fallback(stubber, real.clone());
    let client = Client::with_config(
        Arc::new(transport),
        ClientConfig::default().with_base_url(Url::parse("http://local").unwrap()),
    );

    let request = RequestBuilder::to_path(http::Method::GET, "/unstubbed").build().unwrap();
    let response = client.fetch(request).await;

    assert!(!response.is_error());
    assert_eq!(real.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dynamic_stub_builds_its_response_from_the_matched_request() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local/whoami$").unwrap())
                .respond(
                    http::Method::GET,
                    StubResponse {
                        body: StubBody::Dynamic(Arc::new(|request, _stub| {
                            StubResponse::ok(format!("you asked for {}", request.url.path()))
                        })),
                        ..StubResponse::default()
                    },
                ),
        )
        .await;

    let client = Client::with_config(
        Arc::new(http_stub::StubTransport::new(stubber)),
        ClientConfig::default().with_base_url(Url::parse("http://local").unwrap()),
    );
    let request = RequestBuilder::to_path(http::Method::GET, "/whoami").build().unwrap();
    let response = client.fetch(request).await;

    assert!(!response.is_error());
    assert_eq!(
        response.data.bytes().unwrap().as_ref(),
        b"you asked for /whoami"
    );
}

#[tokio::test]
async fn scoped_guard_reverts_registered_stubs_once_restored() {
    let stubber = Stubber::isolated();
    stubber.disable().await;

    {
        let guard = stubber.scoped().await;
        stubber
            .register(
                Stub::new()
                    .matching(Matcher::url_regex("^http://local/x$").unwrap())
                    .respond(http::Method::GET, StubResponse::ok("stubbed")),
            )
            .await;

        let client = Client::with_config(
            Arc::new(http_stub::StubTransport::new(stubber)),
            ClientConfig::default().with_base_url(Url::parse("http://local").unwrap()),
        );
        let request = RequestBuilder::to_path(http::Method::GET, "/x").build().unwrap();
        let response = client.fetch(request).await;
        assert!(!response.is_error());
        assert_eq!(response.data.bytes().unwrap().as_ref(), b"stubbed");

        guard.restore().await;
    }

    assert!(!stubber.is_enabled().await);
}

//! End-to-end scenarios run through `StubTransport`, exercising the client,
//! validator/retry engine, and body encoders together rather than in isolation.

use http_client::{Client, ClientConfig};
use http_errors::ErrorCategory;
use http_stub::{Matcher, ResponseInterval, Stub, StubResponse, StubTransport, Stubber};
use http_types::{
    ArrayEncoding, Body, BoolEncoding, FormValue, MultipartPart, Progress, ProgressEvent,
    RequestBuilder,
};
use http_validators::{RetryStrategy, Validator, ValidatorAction};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

fn base_config() -> ClientConfig {
    ClientConfig::default().with_base_url(Url::parse("http://local.test").unwrap())
}

#[tokio::test]
async fn post_json_is_echoed_back_unchanged() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/echo$").unwrap())
                .respond(http::Method::POST, StubResponse::echo()),
        )
        .await;

    let client = Client::with_config(Arc::new(StubTransport::new(stubber)), base_config());
    let request = RequestBuilder::to_path(http::Method::POST, "/echo")
        .body(Body::Json(serde_json::json!({"b": 2, "a": 1}), Default::default()))
        .build()
        .unwrap();

    let response = client.fetch(request).await;

    assert!(!response.is_error());
    assert_eq!(response.data.bytes().unwrap().as_ref(), br#"{"a":1,"b":2}"#);
}

#[tokio::test]
async fn form_body_flattens_nested_values_before_echo() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/form$").unwrap())
                .respond(http::Method::POST, StubResponse::echo()),
        )
        .await;

    let client = Client::with_config(Arc::new(StubTransport::new(stubber)), base_config());
    let body = Body::FormUrlEncoded(
        vec![
            ("flag".to_string(), FormValue::Bool(true)),
            (
                "tags".to_string(),
                FormValue::Array(vec![FormValue::from("a"), FormValue::from("b")]),
            ),
            (
                "user".to_string(),
                FormValue::Object(vec![("name".to_string(), FormValue::from("ada"))]),
            ),
        ],
        ArrayEncoding::Brackets,
        BoolEncoding::Numeric,
    );
    let request = RequestBuilder::to_path(http::Method::POST, "/form")
        .body(body)
        .build()
        .unwrap();

    let response = client.fetch(request).await;

    assert!(!response.is_error());
    let text = String::from_utf8(response.data.bytes().unwrap().to_vec()).unwrap();
    assert_eq!(
        text,
        "flag=1&tags%5B%5D=a&tags%5B%5D=b&user%5Bname%5D=ada"
    );
}

#[tokio::test]
async fn expired_credential_refreshes_via_alt_request_then_still_fails() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/secret$").unwrap())
                .respond(http::Method::GET, StubResponse::status(http::StatusCode::UNAUTHORIZED)),
        )
        .await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/login$").unwrap())
                .respond(http::Method::POST, StubResponse::ok("refreshed-token")),
        )
        .await;

    let captured_alt_response = Arc::new(Mutex::new(None));
    let captured_alt_response_for_closure = captured_alt_response.clone();
    let login_request = RequestBuilder::to_path(http::Method::POST, "/login")
        .build()
        .unwrap();

    let client = Client::with_config(Arc::new(StubTransport::new(stubber)), base_config());
    client.clear_validators();
    client.add_validator(Validator::Custom(Arc::new(move |response| {
        if response.status.as_u16() == Some(401) {
            ValidatorAction::Retry(RetryStrategy::After {
                alt_request: Box::new(login_request.clone()),
                delay_before_original: Duration::from_millis(0),
                on_alt_response: {
                    let captured = captured_alt_response_for_closure.clone();
                    Arc::new(move |alt_response| {
                        *captured.lock().unwrap() = Some(alt_response.data.bytes().unwrap().to_vec());
                    })
                },
            })
        } else {
            ValidatorAction::NextValidator
        }
    })));
    client.add_validator(Validator::Default(Default::default()));

    let request = RequestBuilder::to_path(http::Method::GET, "/secret")
        .max_retries(1)
        .build()
        .unwrap();
    let response = client.fetch(request).await;

    assert_eq!(response.status.as_u16(), Some(401));
    assert_eq!(
        response.error.unwrap().category(),
        ErrorCategory::RetryAttemptsReached
    );
    assert_eq!(
        captured_alt_response.lock().unwrap().as_deref(),
        Some(b"refreshed-token".as_slice())
    );
}

#[tokio::test]
async fn two_file_multipart_parts_survive_the_round_trip_unchanged() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/upload$").unwrap())
                .respond(http::Method::POST, StubResponse::echo()),
        )
        .await;

    let client = Client::with_config(Arc::new(StubTransport::new(stubber)), base_config());
    let parts = vec![
        MultipartPart::file("image1", "a.png", "image/png", b"PNGDATA".to_vec()),
        MultipartPart::file("image2", "b.jpg", "image/jpeg", b"JPGDATA".to_vec()),
    ];
    let body = Body::Multipart {
        boundary: "SCENARIOBOUNDARY".to_string(),
        parts,
        preamble: None,
    };
    let request = RequestBuilder::to_path(http::Method::POST, "/upload")
        .body(body)
        .build()
        .unwrap();

    let response = client.fetch(request).await;

    assert!(!response.is_error());
    let expected = b"--SCENARIOBOUNDARY\r\n\
Content-Disposition: form-data; name=\"image1\"; filename=\"a.png\"\r\n\
Content-Type: image/png\r\n\
\r\n\
PNGDATA\r\n\
--SCENARIOBOUNDARY\r\n\
Content-Disposition: form-data; name=\"image2\"; filename=\"b.jpg\"\r\n\
Content-Type: image/jpeg\r\n\
\r\n\
JPGDATA\r\n\
--SCENARIOBOUNDARY--\r\n";
    assert_eq!(response.data.bytes().unwrap().as_ref(), expected.as_slice());
}

#[tokio::test(start_paused = true)]
async fn bandwidth_paced_download_reports_monotonic_progress_to_completion() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    let body = vec![b'x'; 9000];
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/large$").unwrap())
                .respond(
                    http::Method::GET,
                    StubResponse::ok(body.clone()).with_interval(ResponseInterval::Speed(8_000)),
                ),
        )
        .await;

    let client = Client::with_config(Arc::new(StubTransport::new(stubber)), base_config());
    let request = RequestBuilder::to_path(http::Method::GET, "/large").build().unwrap();

    let handle = client.fetch(request);
    let mut progress_rx = handle.progress_receiver();
    let collector = tokio::spawn(async move {
        let mut observed: Vec<Progress> = Vec::new();
        while progress_rx.changed().await.is_ok() {
            observed.push(progress_rx.borrow().clone());
        }
        observed
    });

    let response = handle.await;
    let observed = collector.await.unwrap();

    assert!(!response.is_error());
    assert_eq!(response.data.bytes().unwrap().len(), 9000);

    let download_events: Vec<&Progress> = observed
        .iter()
        .filter(|p| p.event == ProgressEvent::Download)
        .collect();
    assert!(
        download_events.len() > 1,
        "a 9000-byte body paced at 8000 bits/s should arrive in more than one chunk"
    );
    let mut last_percentage = 0.0;
    for progress in &download_events {
        assert!(progress.percentage >= last_percentage, "progress must never regress");
        last_percentage = progress.percentage;
    }
    assert_eq!(download_events.last().unwrap().percentage, 1.0);
}

#[tokio::test(start_paused = true)]
async fn request_timeout_shorter_than_the_stubbed_delay_times_out() {
    let stubber = Stubber::isolated();
    stubber.enable().await;
    stubber
        .register(
            Stub::new()
                .matching(Matcher::url_regex("^http://local.test/slow$").unwrap())
                .respond(
                    http::Method::GET,
                    StubResponse::ok("too late").with_interval(ResponseInterval::Delay(Duration::from_secs(5))),
                ),
        )
        .await;

    let client = Client::with_config(Arc::new(StubTransport::new(stubber)), base_config());
    let request = RequestBuilder::to_path(http::Method::GET, "/slow")
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let response = client.fetch(request).await;

    assert_eq!(response.error.unwrap().category(), ErrorCategory::Timeout);
}

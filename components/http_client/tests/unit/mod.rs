//! End-to-end `Client` tests against a real `wiremock` server through
//! `HyperTransport`, exercising composition, retries, and progress together.

use http_client::{Client, ClientConfig};
use http_transport::HyperTransport;
use http_types::RequestBuilder;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_through_real_transport_round_trips_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = Client::with_config(
        Arc::new(HyperTransport::new()),
        ClientConfig::default().with_base_url(Url::parse(&server.uri()).unwrap()),
    );

    let request = RequestBuilder::to_path(http::Method::GET, "/status").build().unwrap();
    let response = client.fetch(request).await;

    assert!(!response.is_error());
    assert_eq!(response.data.bytes().unwrap().as_ref(), b"ok");
}

#[tokio::test]
async fn default_validator_fails_a_persistent_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = Client::with_config(
        Arc::new(HyperTransport::new()),
        ClientConfig::default().with_base_url(Url::parse(&server.uri()).unwrap()),
    );

    let request = RequestBuilder::to_path(http::Method::GET, "/broken")
        .max_retries(2)
        .build()
        .unwrap();
    let response = client.fetch(request).await;

    assert_eq!(
        response.error.unwrap().category(),
        http_errors::ErrorCategory::ValidatorFailure
    );
}

#[tokio::test]
async fn client_default_query_and_request_query_both_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = Client::with_config(
        Arc::new(HyperTransport::new()),
        ClientConfig::default()
            .with_base_url(Url::parse(&server.uri()).unwrap())
            .with_query("api_key", "secret"),
    );

    let request = RequestBuilder::to_path(http::Method::GET, "/search")
        .query("q", "rust")
        .build()
        .unwrap();
    let response = client.fetch(request).await;

    assert!(!response.is_error());
    assert_eq!(response.url.query(), Some("api_key=secret&q=rust"));
}

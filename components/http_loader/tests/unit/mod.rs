use http_loader::{Loader, LoaderConfig};
use http_transport::HyperTransport;
use http_types::{RequestBuilder, SecurityPolicy, TransferMode};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn large_data_download_is_persisted_to_a_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
        .mount(&server)
        .await;

    let temp_dir = std::env::temp_dir().join(format!("http-loader-it-{}", uuid::Uuid::new_v4()));
    let loader = Loader::with_config(
        Arc::new(HyperTransport::new()),
        LoaderConfig::default().with_temp_dir(temp_dir.clone()),
    );
    let request = RequestBuilder::to_path(http::Method::GET, "/file")
        .transfer_mode(TransferMode::LargeData)
        .build()
        .unwrap();
    let url = url::Url::parse(&format!("{}/file", server.uri())).unwrap();

    let response = loader
        .execute(&request, &url, &SecurityPolicy::Default, None)
        .await;

    assert!(!response.is_error());
    let path = response.data.file_path().expect("large data persists to a file");
    assert_eq!(tokio::fs::read(path).await.unwrap().len(), 4096);
    tokio::fs::remove_dir_all(&temp_dir).await.unwrap();
}

#[tokio::test]
async fn timeout_surfaces_as_timeout_error_with_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(200)))
        .mount(&server)
        .await;

    let loader = Loader::new(Arc::new(HyperTransport::new()));
    let request = RequestBuilder::to_path(http::Method::GET, "/slow")
        .timeout(std::time::Duration::from_millis(20))
        .build()
        .unwrap();
    let url = url::Url::parse(&format!("{}/slow", server.uri())).unwrap();

    let response = loader
        .execute(&request, &url, &SecurityPolicy::Default, None)
        .await;

    assert!(response.is_error());
    assert_eq!(
        response.error.unwrap().category(),
        http_errors::ErrorCategory::Timeout
    );
    assert!(matches!(response.data, http_types::ResponseData::Empty));
}

#[tokio::test]
async fn successful_get_round_trips_body_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("world"))
        .mount(&server)
        .await;

    let loader = Loader::new(Arc::new(HyperTransport::new()));
    let request = RequestBuilder::to_path(http::Method::GET, "/hello").build().unwrap();
    let url = url::Url::parse(&format!("{}/hello", server.uri())).unwrap();

    let response = loader
        .execute(&request, &url, &SecurityPolicy::Default, None)
        .await;

    assert!(response.status.is_success());
    assert_eq!(response.data.bytes().unwrap().as_ref(), b"world");
}

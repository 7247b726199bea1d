use bytes::Bytes;
use http::{HeaderMap, Method};
use http_transport::{HyperTransport, Transport, TransportBody, TransportTask};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn collect_body(response: http_transport::TransportResponse) -> Bytes {
    use futures::StreamExt;
    let mut buf = Vec::new();
    let mut body = response.body;
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk.unwrap());
    }
    Bytes::from(buf)
}

#[tokio::test]
async fn executes_a_get_and_collects_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("world"))
        .mount(&server)
        .await;

    let transport = HyperTransport::new();
    let task = TransportTask {
        method: Method::GET,
        url: url::Url::parse(&format!("{}/hello", server.uri())).unwrap(),
        headers: HeaderMap::new(),
        body: TransportBody::Empty,
        timeout: None,
    };
    let response = transport.execute(task).await.unwrap();
    assert_eq!(response.status, http::StatusCode::OK);
    assert_eq!(collect_body(response).await.as_ref(), b"world");
}

#[tokio::test]
async fn sends_a_bytes_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = HyperTransport::new();
    let task = TransportTask {
        method: Method::POST,
        url: url::Url::parse(&format!("{}/echo", server.uri())).unwrap(),
        headers: HeaderMap::new(),
        body: TransportBody::Bytes(Bytes::from_static(b"payload")),
        timeout: None,
    };
    let response = transport.execute(task).await.unwrap();
    assert_eq!(response.status, http::StatusCode::OK);
}

#[tokio::test]
async fn timeout_elapses_before_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(200)))
        .mount(&server)
        .await;

    let transport = HyperTransport::new();
    let task = TransportTask {
        method: Method::GET,
        url: url::Url::parse(&format!("{}/slow", server.uri())).unwrap(),
        headers: HeaderMap::new(),
        body: TransportBody::Empty,
        timeout: Some(std::time::Duration::from_millis(20)),
    };
    let err = transport.execute(task).await.unwrap_err();
    assert_eq!(err.category(), http_errors::ErrorCategory::Timeout);
}

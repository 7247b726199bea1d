//! The production [`Transport`] implementation, built on `hyper`/`hyper-util`'s
//! legacy client plus `http-body-util` (§4.2 design note).
//!
//! Generic over the `Connect` implementation so a caller can plug in TLS (e.g.
//! `hyper-rustls`) without this crate taking a position on which TLS stack to use —
//! concrete TLS is explicitly out of scope for this library (§1).

use crate::task::{TransportBody, TransportResponse, TransportTask};
use crate::Transport;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Request as WireRequest;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyDataStream, BodyExt, Full, StreamBody};
use http_errors::{HttpError, HttpResult};
use hyper::body::Frame;
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

type Boxed = BoxBody<Bytes, std::io::Error>;

/// A `Transport` backed by `hyper-util`'s legacy client.
///
/// Defaults to a plain-HTTP [`HttpConnector`]; use [`HyperTransport::with_connector`]
/// to supply a TLS-capable connector for `https://` targets.
pub struct HyperTransport<C = HttpConnector> {
    client: Client<C, Boxed>,
}

impl HyperTransport<HttpConnector> {
    /// Build a transport using a plain-HTTP connector
    pub fn new() -> Self {
        Self::with_connector(HttpConnector::new())
    }
}

impl Default for HyperTransport<HttpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> HyperTransport<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    /// Build a transport using a caller-supplied connector
    pub fn with_connector(connector: C) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
        }
    }
}

#[async_trait]
impl<C> Transport for HyperTransport<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    async fn execute(&self, task: TransportTask) -> HttpResult<TransportResponse> {
        let body: Boxed = match task.body {
            TransportBody::Empty => Full::new(Bytes::new())
                .map_err(|never: std::convert::Infallible| match never {})
                .boxed(),
            TransportBody::Bytes(bytes) => Full::new(bytes)
                .map_err(|never: std::convert::Infallible| match never {})
                .boxed(),
            TransportBody::Stream(stream, _known_length) => {
                let frames = stream.map(|chunk| chunk.map(Frame::data));
                StreamBody::new(frames).boxed()
            }
        };

        let mut request = WireRequest::builder()
            .method(task.method)
            .uri(task.url.as_str())
            .body(body)
            .map_err(|e| HttpError::FailedBuildingRequest(e.to_string()))?;
        *request.headers_mut() = task.headers;

        let send = self.client.request(request);
        let response = match task.timeout {
            Some(duration) => match tokio::time::timeout(duration, send).await {
                Ok(result) => result.map_err(classify_hyper_error)?,
                Err(_) => return Err(HttpError::Timeout(duration)),
            },
            None => send.await.map_err(classify_hyper_error)?,
        };

        let (parts, incoming) = response.into_parts();
        let body_stream = BodyDataStream::new(incoming)
            .map(|chunk| chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string())));

        Ok(TransportResponse {
            status: parts.status,
            headers: parts.headers,
            body: Box::pin(body_stream),
        })
    }
}

fn classify_hyper_error(err: hyper_util::client::legacy::Error) -> HttpError {
    if err.is_connect() {
        HttpError::MissingConnection
    } else {
        HttpError::Network(err.to_string())
    }
}

//! [`StubTransport`]: the in-process, matcher-driven [`Transport`] implementation
//! (§4.4) swapped in for tests via the client's configuration — never by
//! monkeypatching the production transport.

use crate::matcher::StubbedRequest;
use crate::registry::{StubberHandle, UnhandledMode};
use crate::stub::{Stub, StubBody, StubResponse};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http_errors::{HttpError, HttpResult};
use http_transport::{ResponseBodyStream, Transport, TransportBody, TransportResponse, TransportTask};
use std::sync::Arc;
use std::time::Duration;

/// A `Transport` that intercepts outbound requests against a [`StubberHandle`]'s
/// registered stubs, synthesizing responses instead of performing network I/O.
pub struct StubTransport {
    stubber: StubberHandle,
    fallback: Option<Arc<dyn Transport>>,
}

impl StubTransport {
    /// Build a transport over the given registry with no pass-through fallback;
    /// an `optin`-mode unmatched request or an ignore-rule match becomes
    /// [`HttpError::Internal`] rather than silently doing nothing.
    pub fn new(stubber: StubberHandle) -> Self {
        Self {
            stubber,
            fallback: None,
        }
    }

    /// Build a transport that falls back to `fallback` for ignore-rule matches
    /// and, in `optin` mode, for requests matching no stub.
    pub fn with_fallback(stubber: StubberHandle, fallback: Arc<dyn Transport>) -> Self {
        Self {
            stubber,
            fallback: Some(fallback),
        }
    }

    async fn pass_through(&self, task: TransportTask) -> HttpResult<TransportResponse> {
        match &self.fallback {
            Some(transport) => transport.execute(task).await,
            None => Err(HttpError::Internal(
                "stub transport has no fallback configured for pass-through".to_string(),
            )),
        }
    }

    async fn dispatch(&self, task: TransportTask) -> HttpResult<TransportResponse> {
        let body = collect_task_body(task.body).await?;
        let snapshot = StubbedRequest {
            method: task.method.clone(),
            url: task.url.clone(),
            headers: task.headers.clone(),
            body: body.clone(),
        };

        let state = self.stubber.inner().state.read().await;
        if !state.enabled {
            drop(state);
            tracing::debug!(url = %snapshot.url, "stubber disabled, passing through");
            return self.pass_through(rebuild_task(task, body)).await;
        }

        if state.ignore_rules.iter().any(|(_, stub)| stub.matches(&snapshot)) {
            drop(state);
            tracing::debug!(url = %snapshot.url, "ignore rule matched, passing through");
            return self.pass_through(rebuild_task(task, body)).await;
        }

        let matched = state
            .stubs
            .iter()
            .find(|(_, stub)| stub.matches(&snapshot))
            .map(|(_, stub)| stub.clone());
        let unhandled_mode = state.unhandled_mode;
        drop(state);

        match matched {
            Some(stub) => {
                tracing::debug!(url = %snapshot.url, method = %snapshot.method, "stub matched");
                synthesize(&snapshot, &stub).await
            }
            None => match unhandled_mode {
                UnhandledMode::OptIn => {
                    tracing::debug!(url = %snapshot.url, "no stub matched, optin pass-through");
                    self.pass_through(rebuild_task(task, body)).await
                }
                UnhandledMode::OptOut => Err(HttpError::StubUnhandled),
            },
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, task: TransportTask) -> HttpResult<TransportResponse> {
        let timeout = task.timeout;
        let work = self.dispatch(task);
        match timeout {
            Some(duration) => match tokio::time::timeout(duration, work).await {
                Ok(result) => result,
                Err(_) => Err(HttpError::Timeout(duration)),
            },
            None => work.await,
        }
    }
}

fn rebuild_task(task: TransportTask, body: Bytes) -> TransportTask {
    TransportTask {
        method: task.method,
        url: task.url,
        headers: task.headers,
        body: TransportBody::Bytes(body),
        timeout: task.timeout,
    }
}

async fn collect_task_body(body: TransportBody) -> HttpResult<Bytes> {
    match body {
        TransportBody::Empty => Ok(Bytes::new()),
        TransportBody::Bytes(bytes) => Ok(bytes),
        TransportBody::Stream(mut stream, _known_length) => {
            let mut buffer = BytesMut::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| HttpError::Network(e.to_string()))?;
                buffer.extend_from_slice(&chunk);
            }
            Ok(buffer.freeze())
        }
    }
}

/// Resolve a matched stub into a [`TransportResponse`]. A [`StubBody::Dynamic`]
/// response is built once; a dynamic builder that itself returns another
/// dynamic response is rejected as a configuration error rather than recursed
/// into indefinitely (§4.4 "Dynamic stub").
async fn synthesize(request: &StubbedRequest, stub: &Stub) -> HttpResult<TransportResponse> {
    let response = stub
        .response_for(&request.method)
        .cloned()
        .ok_or(HttpError::StubMethodNotConfigured)?;

    let response = if let StubBody::Dynamic(builder) = &response.body {
        let built = builder(request, stub);
        if matches!(built.body, StubBody::Dynamic(_)) {
            return Err(HttpError::Internal(
                "dynamic stub response returned another dynamic response".to_string(),
            ));
        }
        built
    } else {
        response
    };

    build_transport_response(request, response).await
}

async fn build_transport_response(
    request: &StubbedRequest,
    response: StubResponse,
) -> HttpResult<TransportResponse> {
    if let Some(failure) = &response.failure_error {
        return Err((failure.0)());
    }

    let body = match response.body {
        StubBody::Bytes(bytes) => bytes,
        StubBody::String(text) => Bytes::from(text),
        StubBody::File(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| HttpError::InvalidResponse(e.to_string()))?;
            Bytes::from(bytes)
        }
        StubBody::Echo => request.body.clone(),
        StubBody::Dynamic(_) => {
            unreachable!("dynamic stub responses are resolved before build_transport_response runs")
        }
    };

    let mut headers = response.headers.clone();
    if let Some(content_type) = &response.content_type {
        if let Ok(value) = content_type.parse() {
            headers.insert(http::header::CONTENT_TYPE, value);
        }
    }
    if let Ok(value) = body.len().to_string().parse() {
        headers.insert(http::header::CONTENT_LENGTH, value);
    }

    let stream = paced_body_stream(body, response.response_interval);

    Ok(TransportResponse {
        status: response.status_code,
        headers,
        body: stream,
    })
}

fn paced_body_stream(body: Bytes, interval: crate::stub::ResponseInterval) -> ResponseBodyStream {
    use crate::stub::ResponseInterval;

    match interval {
        ResponseInterval::Immediate => Box::pin(futures::stream::once(async move { Ok(body) })),
        ResponseInterval::Delay(duration) => Box::pin(futures::stream::once(async move {
            tokio::time::sleep(duration).await;
            Ok(body)
        })),
        ResponseInterval::Speed(bits_per_second) => speed_paced_stream(body, bits_per_second),
    }
}

/// Slice `body` into fixed-size chunks and sleep between each so that total
/// emission time approximates `bodyBytes * 8 / bitsPerSecond` (§4.4).
fn speed_paced_stream(body: Bytes, bits_per_second: u64) -> ResponseBodyStream {
    const CHUNK_SIZE: usize = 4096;
    let bytes_per_second = (bits_per_second / 8).max(1) as f64;

    if body.is_empty() {
        return Box::pin(futures::stream::once(async move { Ok(body) }));
    }

    Box::pin(futures::stream::unfold(0usize, move |offset| {
        let body = body.clone();
        async move {
            if offset >= body.len() {
                return None;
            }
            let end = (offset + CHUNK_SIZE).min(body.len());
            let chunk = body.slice(offset..end);
            let duration = Duration::from_secs_f64(chunk.len() as f64 / bytes_per_second);
            if !duration.is_zero() {
                tokio::time::sleep(duration).await;
            }
            Some((Ok(chunk), end))
        }
    }))
}

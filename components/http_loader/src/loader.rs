//! The data loader: drives one execution attempt (including internal redirect and
//! authentication-challenge follow-up) against a [`Transport`], producing a
//! [`Response`] (§4.2).

use crate::config::LoaderConfig;
use crate::{auth, redirect, tempstore};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http::HeaderMap;
use http_errors::{HttpError, HttpResult};
use http_transport::{Transport, TransportBody, TransportTask};
use http_types::{
    ChallengeDisposition, Metrics, PartialData, Progress, ProgressEvent, Request, Response,
    ResponseData, ResponseStatus, SecurityPolicy, TransferMode,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use url::Url;

struct AttemptOutcome {
    status: http::StatusCode,
    headers: HeaderMap,
    data: ResponseData,
    metrics: Metrics,
}

/// Drives single-attempt network execution on behalf of the client and retry
/// engine, including the internal redirect-following and authentication-challenge
/// handling described in §4.2 steps 4-5.
///
/// Retries (§4.3) are not this type's concern: the validator chain calls
/// [`Loader::execute`] again, with a fresh [`Request`], for each retry attempt.
pub struct Loader {
    config: LoaderConfig,
    transport: Arc<dyn Transport>,
}

impl Loader {
    /// Build a loader around the given transport, using default configuration.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, LoaderConfig::default())
    }

    /// Build a loader around the given transport and configuration.
    pub fn with_config(transport: Arc<dyn Transport>, config: LoaderConfig) -> Self {
        Self { config, transport }
    }

    /// Execute one full attempt for an already URL-resolved request.
    ///
    /// This never returns `Err`: transport and build-time failures are captured
    /// into the returned [`Response`]'s `error` field, per the §7 propagation
    /// policy. `effective_security` is used when `request.security` is `None`.
    pub async fn execute(
        &self,
        request: &Request,
        resolved_url: &Url,
        effective_security: &SecurityPolicy,
        progress: Option<watch::Sender<Progress>>,
    ) -> Response {
        let original = request.clone();
        let mut current_request = request.clone();
        let mut current_url = resolved_url.clone();
        let mut redirects = 0u32;
        let mut auth_attempted = false;

        loop {
            let outcome = self
                .run_single_attempt(&current_request, &current_url, progress.as_ref())
                .await;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::warn!(url = %current_url, %error, "transport attempt failed");
                    return Response {
                        url: current_url,
                        status: ResponseStatus::None,
                        headers: HeaderMap::new(),
                        data: ResponseData::Empty,
                        metrics: Metrics::default(),
                        error: Some(error),
                        original_request: original,
                        current_request,
                    };
                }
            };

            let status_code = outcome.status.as_u16();

            if redirects < self.config.max_redirects {
                if let Some((next_request, next_url)) = redirect::next_redirect_request(
                    &current_request,
                    &current_url,
                    status_code,
                    &outcome.headers,
                ) {
                    redirects += 1;
                    tracing::debug!(from = %current_url, to = %next_url, status_code, "following redirect");
                    current_request = next_request;
                    current_url = next_url;
                    continue;
                }
            }

            if status_code == 401 && !auth_attempted {
                if let Some(challenge) =
                    auth::challenge_from_response(&outcome.headers, &current_url, 0)
                {
                    let security = current_request
                        .security
                        .as_ref()
                        .unwrap_or(effective_security);
                    if let ChallengeDisposition::UseCredential(credential) =
                        security.resolve(&challenge)
                    {
                        auth_attempted = true;
                        tracing::debug!(url = %current_url, "retrying with resolved credential after auth challenge");
                        let mut retried = current_request.clone();
                        retried.headers.insert(
                            http::header::AUTHORIZATION,
                            auth::basic_auth_header_value(&credential)
                                .parse()
                                .expect("base64 auth header value is a valid header value"),
                        );
                        current_request = retried;
                        continue;
                    }
                }
            }

            return Response {
                url: current_url,
                status: ResponseStatus::Code(outcome.status),
                headers: outcome.headers,
                data: outcome.data,
                metrics: outcome.metrics,
                error: None,
                original_request: original,
                current_request,
            };
        }
    }

    async fn run_single_attempt(
        &self,
        request: &Request,
        url: &Url,
        progress: Option<&watch::Sender<Progress>>,
    ) -> HttpResult<AttemptOutcome> {
        let attempt_start = Instant::now();
        let encoded = http_body::encode_body(&request.body).await?;

        let mut headers = request.headers.clone();
        if let Some(content_type) = &encoded.content_type {
            if !headers.contains_key(http::header::CONTENT_TYPE) {
                let value = content_type.parse().map_err(|_| {
                    HttpError::FailedBuildingRequest("invalid content-type header value".to_string())
                })?;
                headers.insert(http::header::CONTENT_TYPE, value);
            }
        }
        if let Some(length) = encoded.content_length {
            if !headers.contains_key(http::header::CONTENT_LENGTH) {
                let value = length
                    .to_string()
                    .parse()
                    .expect("decimal digits are always a valid header value");
                headers.insert(http::header::CONTENT_LENGTH, value);
            }
        }

        let bytes_sent = encoded.content_length.unwrap_or(0);
        let transport_body = match encoded.payload {
            http_body::BodyPayload::Empty => TransportBody::Empty,
            http_body::BodyPayload::Bytes(bytes) => TransportBody::Bytes(bytes),
            http_body::BodyPayload::Stream(stream) => {
                TransportBody::Stream(stream, encoded.content_length)
            }
        };

        let resume_from: Option<&PartialData> = if request.transfer_mode == TransferMode::LargeData
        {
            request.partial_data.as_ref()
        } else {
            None
        };
        let already_received = resume_from.map(|partial| partial.bytes.clone()).unwrap_or_default();

        if !already_received.is_empty() && !headers.contains_key(http::header::RANGE) {
            let value = format!("bytes={}-", already_received.len())
                .parse()
                .expect("a decimal byte offset is always a valid header value");
            headers.insert(http::header::RANGE, value);
        }

        let task = TransportTask {
            method: request.method.clone(),
            url: url.clone(),
            headers,
            body: transport_body,
            timeout: request.timeout,
        };

        if let Some(sender) = progress {
            let _ = sender.send(Progress::new(ProgressEvent::Upload, bytes_sent, bytes_sent as i64));
        }

        let response = self.transport.execute(task).await?;
        let time_to_first_byte = attempt_start.elapsed();

        let remote_length = content_length_header(&response.headers);
        let expected_bytes = if !already_received.is_empty() && remote_length >= 0 {
            remote_length + already_received.len() as i64
        } else {
            remote_length
        };

        if !already_received.is_empty() {
            if let Some(sender) = progress {
                let _ = sender.send(Progress::new(
                    ProgressEvent::Resumed,
                    already_received.len() as u64,
                    expected_bytes,
                ));
            }
        }

        let file_name = resume_from
            .and_then(|partial| partial.file_name.clone())
            .unwrap_or_else(|| tempstore::deterministic_file_name(&request.method, url));

        let bytes = match collect_body(response.body, expected_bytes, already_received, progress).await
        {
            Ok(bytes) => bytes,
            Err((partial_bytes, error)) => {
                if request.transfer_mode == TransferMode::LargeData && !partial_bytes.is_empty() {
                    if let Err(persist_error) = tempstore::persist_bytes(
                        &self.config.temp_dir,
                        &file_name,
                        &partial_bytes,
                    )
                    .await
                    {
                        tracing::warn!(%persist_error, "failed persisting partial data for resume");
                    }
                    if let Some(sender) = progress {
                        let _ = sender.send(
                            Progress::new(ProgressEvent::Failed, partial_bytes.len() as u64, expected_bytes)
                                .with_partial_data(partial_bytes),
                        );
                    }
                }
                return Err(error);
            }
        };

        let data = match request.transfer_mode {
            TransferMode::Default => ResponseData::Memory(bytes.clone()),
            TransferMode::LargeData => {
                let path = tempstore::persist_bytes(&self.config.temp_dir, &file_name, &bytes)
                    .await
                    .map_err(|e| HttpError::InvalidResponse(e.to_string()))?;
                ResponseData::File(path)
            }
        };

        let metrics = Metrics {
            total_duration: Some(attempt_start.elapsed()),
            time_to_first_byte: Some(time_to_first_byte),
            bytes_sent,
            bytes_received: bytes.len() as u64,
            attempt_count: 1,
        };

        Ok(AttemptOutcome {
            status: response.status,
            headers: response.headers,
            data,
            metrics,
        })
    }
}

fn content_length_header(headers: &HeaderMap) -> i64 {
    headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(-1)
}

/// Collect a response body stream into memory, seeded with bytes already received
/// from an earlier (resumed) attempt.
///
/// On a mid-stream read failure, returns the bytes collected so far (seed included)
/// alongside the error, so a `largeData` caller can persist them for a later resume.
async fn collect_body(
    mut stream: http_transport::ResponseBodyStream,
    expected_bytes: i64,
    seed: Bytes,
    progress: Option<&watch::Sender<Progress>>,
) -> Result<Bytes, (Bytes, HttpError)> {
    let mut buffer = BytesMut::new();
    buffer.extend_from_slice(&seed);
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                buffer.extend_from_slice(&chunk);
                if let Some(sender) = progress {
                    let _ = sender.send(Progress::new(
                        ProgressEvent::Download,
                        buffer.len() as u64,
                        expected_bytes,
                    ));
                }
            }
            Err(e) => return Err((buffer.freeze(), HttpError::Network(e.to_string()))),
        }
    }
    Ok(buffer.freeze())
}

//! Response model

use crate::request::Request;
use bytes::Bytes;
use http::HeaderMap;
use http_errors::HttpError;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP status, with an explicit "none" state for responses that never reached
/// the point of having one (e.g. a build-time or connection failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// A status code was received
    Code(http::StatusCode),
    /// No status code was ever received
    None,
}

impl ResponseStatus {
    /// The numeric status code, if any
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            ResponseStatus::Code(code) => Some(code.as_u16()),
            ResponseStatus::None => None,
        }
    }

    /// Whether this is a 2xx status
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseStatus::Code(code) if code.is_success())
    }

    /// Whether this is a 3xx status
    pub fn is_redirection(&self) -> bool {
        matches!(self, ResponseStatus::Code(code) if code.is_redirection())
    }
}

/// Where a response's body bytes live
#[derive(Debug, Clone)]
pub enum ResponseData {
    /// Body fully collected in memory
    Memory(Bytes),
    /// Body persisted to a file under the library's temp directory (`largeData`
    /// transfers only — see the §3 invariant `dataFileURL != nil => transferMode
    /// was largeData`)
    File(PathBuf),
    /// No body was received
    Empty,
}

impl ResponseData {
    /// The on-disk path, if this response's data was persisted to a file
    pub fn file_path(&self) -> Option<&std::path::Path> {
        match self {
            ResponseData::File(path) => Some(path.as_path()),
            _ => None,
        }
    }

    /// Read this response's bytes into memory, reading the file from disk if needed
    pub fn bytes(&self) -> std::io::Result<Bytes> {
        match self {
            ResponseData::Memory(bytes) => Ok(bytes.clone()),
            ResponseData::Empty => Ok(Bytes::new()),
            ResponseData::File(path) => Ok(Bytes::from(std::fs::read(path)?)),
        }
    }
}

/// Timing and transfer-size metrics for one request attempt (no navigation-level
/// timestamps, since this is not a browser).
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Wall-clock time from dispatch to final byte received
    pub total_duration: Option<Duration>,
    /// Time to first response byte
    pub time_to_first_byte: Option<Duration>,
    /// Bytes sent (request line + headers + body)
    pub bytes_sent: u64,
    /// Bytes received (status line + headers + body)
    pub bytes_received: u64,
    /// Number of transport attempts this metrics value reflects (1 unless retried)
    pub attempt_count: u32,
}

/// An HTTP response
///
/// Produced exactly once per attempt by the data loader (§4.2); may be replaced
/// wholesale by a validator ([`crate::request`]-level retry engine lives in
/// `http_validators`), with response transformers running last.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL after any redirects
    pub url: url::Url,
    /// HTTP status
    pub status: ResponseStatus,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body data
    pub data: ResponseData,
    /// Timing and size metrics
    pub metrics: Metrics,
    /// Error associated with this response, if any. `is_error() == error.is_some()`
    /// always holds; a 2xx status does not by itself imply `error` is `None`, since
    /// a validator may synthesize one (§3 invariant).
    pub error: Option<HttpError>,
    /// The request as originally submitted, before any redirects
    pub original_request: Request,
    /// The request that actually produced this response (post-redirect)
    pub current_request: Request,
}

impl Response {
    /// Whether this response carries an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Construct a response representing a build-time or transport failure that
    /// never reached a status line.
    pub fn error_response(error: HttpError, request: Request) -> Response {
        Response {
            url: request_url_or_placeholder(&request),
            status: ResponseStatus::None,
            headers: HeaderMap::new(),
            data: ResponseData::Empty,
            metrics: Metrics::default(),
            error: Some(error),
            original_request: request.clone(),
            current_request: request,
        }
    }

    /// Replace this response's error, following the §7 propagation policy that
    /// validator-originated errors replace any existing error.
    pub fn with_error(mut self, error: HttpError) -> Response {
        self.error = Some(error);
        self
    }
}

fn request_url_or_placeholder(request: &Request) -> url::Url {
    match &request.target {
        crate::request::RequestTarget::Absolute(url) => url.clone(),
        crate::request::RequestTarget::Path(_) => {
            url::Url::parse("about:invalid").expect("static URL always parses")
        }
    }
}

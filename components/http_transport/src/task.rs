//! Transport-level task and response types
//!
//! These sit one layer below [`http_types::Request`]/[`http_types::Response`]: by
//! the time a `TransportTask` exists, the client has already resolved the URL and
//! merged headers (§4.1), and `http_body` has already encoded the body.

use bytes::Bytes;
use futures::stream::Stream;
use http::{HeaderMap, Method};
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// A lazily-consumed response body chunk stream
pub type ResponseBodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// The already-encoded body a [`TransportTask`] carries
pub enum TransportBody {
    /// No body
    Empty,
    /// Fully materialized bytes
    Bytes(Bytes),
    /// A lazily-consumed byte stream, with its known length if any
    Stream(http_types::BodyStream, Option<u64>),
}

/// One fully-resolved network attempt, ready to hand to a [`crate::Transport`]
pub struct TransportTask {
    /// HTTP method
    pub method: Method,
    /// Absolute URL to request
    pub url: Url,
    /// Final, merged request headers
    pub headers: HeaderMap,
    /// Encoded request body
    pub body: TransportBody,
    /// Timeout for this single attempt, if any
    pub timeout: Option<Duration>,
}

/// The result of one successful transport attempt
pub struct TransportResponse {
    /// Status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body, as a lazily-consumed chunk stream so the data loader can
    /// decide whether to collect it in memory or persist it to a file (§4.2)
    /// without the transport caring which.
    pub body: ResponseBodyStream,
}

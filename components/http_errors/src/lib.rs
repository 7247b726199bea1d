//! http_errors component
//!
//! Error taxonomy for the HTTP client library: `HttpError`, `HttpResult`, and the
//! `ErrorCategory` tag used by validators and callers to classify a failure without
//! matching on the full error payload.
//!
//! A single, dependency-light crate that every other component in this workspace
//! depends on.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

use std::time::Duration;
use thiserror::Error;

/// Error category tag
///
/// A coarse classification of an [`HttpError`], independent of the specific variant.
/// Validators and callers match on this rather than on `HttpError` directly so that
/// new variants can be added within a category without breaking `match` arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request URL could not be parsed or resolved
    InvalidUrl,
    /// A multipart part referenced a file that could not be opened or read
    MultipartInvalidFile,
    /// Multipart body serialization failed
    MultipartEncodingFailed,
    /// Reading a multipart stream part failed mid-transfer
    MultipartStreamReadFailed,
    /// JSON body serialization failed
    JsonEncodingFailed,
    /// Form-urlencoded body serialization failed
    UrlEncodingFailed,
    /// Generic transport/network failure
    Network,
    /// No network connectivity was available
    MissingConnection,
    /// The request exceeded its timeout
    Timeout,
    /// The transport returned a response that could not be interpreted
    InvalidResponse,
    /// The request could not be built (header/body invariant violation)
    FailedBuildingRequest,
    /// A caller-supplied decoder failed on an otherwise successful response
    DecodeFailed,
    /// The response body was empty and `allowsEmptyResponses` was false
    EmptyResponse,
    /// A validator requested a retry but the retry budget was exhausted
    RetryAttemptsReached,
    /// A validator explicitly failed the chain
    ValidatorFailure,
    /// The underlying session/transport reported an opaque error
    SessionError,
    /// The request was cancelled
    Cancelled,
    /// The stubber matched a stub with no response configured for the request method
    StubMethodNotConfigured,
    /// No stub matched and the stubber is in `optout` mode
    StubUnhandled,
    /// An invariant the library itself is responsible for maintaining was violated
    Internal,
}

/// HTTP client error
///
/// Represents every failure mode this crate's request/response lifecycle can produce.
/// Each variant maps to exactly one [`ErrorCategory`] via [`HttpError::category`].
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request URL could not be parsed, or neither an absolute URL nor a
    /// client base URL + path was available to resolve one.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A multipart part's file source could not be opened or read.
    #[error("multipart file error: {0}")]
    MultipartInvalidFile(String),

    /// Multipart body serialization failed (e.g. a header containing CR/LF).
    #[error("multipart encoding failed: {0}")]
    MultipartEncodingFailed(String),

    /// A multipart stream part's source stream returned an error mid-read.
    #[error("multipart stream read failed: {0}")]
    MultipartStreamReadFailed(String),

    /// JSON serialization of the request body failed.
    #[error("JSON encoding failed: {0}")]
    JsonEncodingFailed(#[source] serde_json_error::SerdeJsonError),

    /// Form-urlencoded serialization failed.
    #[error("URL encoding failed: {0}")]
    UrlEncodingFailed(String),

    /// A transport-level network error occurred (connection refused, reset, DNS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// No network connectivity was available to attempt the request.
    #[error("missing connection")]
    MissingConnection,

    /// The request exceeded its configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The transport returned a response the loader could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built because an invariant was violated.
    #[error("failed building request: {0}")]
    FailedBuildingRequest(String),

    /// A caller-supplied decoder failed to decode an otherwise successful response.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The response body was empty while `allowsEmptyResponses` was false.
    #[error("empty response")]
    EmptyResponse,

    /// A validator requested another retry but `currentRetry == maxRetries`.
    #[error("retry attempts reached")]
    RetryAttemptsReached {
        /// The last underlying error observed before retries were exhausted
        #[source]
        last: Box<HttpError>,
    },

    /// A validator explicitly failed the chain. Carries the validator's own error
    /// as its source so callers can still inspect the original cause (§7).
    #[error("validator failed the chain: {source}")]
    ValidatorFailure {
        /// The error the validator supplied
        #[source]
        source: Box<HttpError>,
    },

    /// The underlying session/transport reported an opaque error not otherwise classified.
    #[error("session error: {0}")]
    SessionError(String),

    /// The request was cancelled before completion.
    #[error("request cancelled")]
    Cancelled,

    /// A stub matched the request but had no response configured for its method.
    #[error("stub has no response configured for this method")]
    StubMethodNotConfigured,

    /// No stub matched the request and the stubber is in `optout` mode.
    #[error("no stub matched request and stubber is in optout mode")]
    StubUnhandled,

    /// An internal invariant was violated; indicates a bug in this library.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HttpError {
    /// Classify this error into its [`ErrorCategory`]
    pub fn category(&self) -> ErrorCategory {
        match self {
            HttpError::InvalidUrl(_) => ErrorCategory::InvalidUrl,
            HttpError::MultipartInvalidFile(_) => ErrorCategory::MultipartInvalidFile,
            HttpError::MultipartEncodingFailed(_) => ErrorCategory::MultipartEncodingFailed,
            HttpError::MultipartStreamReadFailed(_) => ErrorCategory::MultipartStreamReadFailed,
            HttpError::JsonEncodingFailed(_) => ErrorCategory::JsonEncodingFailed,
            HttpError::UrlEncodingFailed(_) => ErrorCategory::UrlEncodingFailed,
            HttpError::Network(_) => ErrorCategory::Network,
            HttpError::MissingConnection => ErrorCategory::MissingConnection,
            HttpError::Timeout(_) => ErrorCategory::Timeout,
            HttpError::InvalidResponse(_) => ErrorCategory::InvalidResponse,
            HttpError::FailedBuildingRequest(_) => ErrorCategory::FailedBuildingRequest,
            HttpError::DecodeFailed(_) => ErrorCategory::DecodeFailed,
            HttpError::EmptyResponse => ErrorCategory::EmptyResponse,
            HttpError::RetryAttemptsReached { .. } => ErrorCategory::RetryAttemptsReached,
            HttpError::ValidatorFailure { .. } => ErrorCategory::ValidatorFailure,
            HttpError::SessionError(_) => ErrorCategory::SessionError,
            HttpError::Cancelled => ErrorCategory::Cancelled,
            HttpError::StubMethodNotConfigured => ErrorCategory::StubMethodNotConfigured,
            HttpError::StubUnhandled => ErrorCategory::StubUnhandled,
            HttpError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Wrap this error as the terminal error of an exhausted retry budget
    pub fn into_retry_attempts_reached(self) -> HttpError {
        HttpError::RetryAttemptsReached {
            last: Box::new(self),
        }
    }
}

/// Result type alias for HTTP client operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Thin wrapper so `serde_json::Error` can sit behind `#[source]` without pulling
/// `serde_json` itself into this leaf crate's public dependency surface.
pub mod serde_json_error {
    use std::fmt;

    /// Opaque, displayable snapshot of a `serde_json::Error`
    #[derive(Debug)]
    pub struct SerdeJsonError(String);

    impl fmt::Display for SerdeJsonError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl std::error::Error for SerdeJsonError {}

    impl From<serde_json::Error> for SerdeJsonError {
        fn from(err: serde_json::Error) -> Self {
            SerdeJsonError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::JsonEncodingFailed(err.into())
    }
}

//! `Stub` and `StubResponse` (§3, §4.4): a matcher set plus a per-method response
//! table, and the response shape the stubber synthesizes when a stub matches.

use crate::matcher::{Matcher, StubbedRequest};
use bytes::Bytes;
use http_errors::HttpError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The source of a [`StubResponse`]'s body.
#[derive(Clone)]
pub enum StubBody {
    /// Fixed bytes
    Bytes(Bytes),
    /// Fixed UTF-8 text
    String(String),
    /// Read from a file on disk at synthesis time
    File(PathBuf),
    /// Reflect the matched request's body back unchanged (§4.4 "Echo stub")
    Echo,
    /// Build the response from the matched request and stub at synthesis time
    /// (§4.4 "Dynamic stub").
    Dynamic(Arc<dyn Fn(&StubbedRequest, &Stub) -> StubResponse + Send + Sync>),
}

impl std::fmt::Debug for StubBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StubBody::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            StubBody::String(s) => f.debug_tuple("String").field(s).finish(),
            StubBody::File(p) => f.debug_tuple("File").field(p).finish(),
            StubBody::Echo => f.debug_tuple("Echo").finish(),
            StubBody::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<fn>").finish(),
        }
    }
}

/// How the stubber paces emission of a synthesized response body (§4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseInterval {
    /// Emit the full body in one chunk, with no artificial delay
    Immediate,
    /// Sleep, then emit the full body in one chunk
    Delay(Duration),
    /// Slice the body into chunks and emit them across time so total send time
    /// is approximately `bodyBytes * 8 / bitsPerSecond`
    Speed(u64),
}

impl Default for ResponseInterval {
    fn default() -> Self {
        ResponseInterval::Immediate
    }
}

/// A canned error the stubber delivers in place of a synthesized status/body
/// (§4.4 "If `failureError` is set, deliver it instead").
#[derive(Clone)]
pub struct StubFailure(pub Arc<dyn Fn() -> HttpError + Send + Sync>);

impl std::fmt::Debug for StubFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StubFailure").field(&"<fn>").finish()
    }
}

impl StubFailure {
    /// Wrap a fixed error value that is cloned by reconstruction each time the
    /// stub is hit. `HttpError` is not `Clone`, so the factory re-builds it from
    /// a lightweight description rather than holding an `HttpError` directly.
    pub fn timeout(after: Duration) -> Self {
        StubFailure(Arc::new(move || HttpError::Timeout(after)))
    }

    /// Wrap a `missingConnection` failure.
    pub fn missing_connection() -> Self {
        StubFailure(Arc::new(|| HttpError::MissingConnection))
    }
}

/// The response a matched [`Stub`] produces for one request method (§3).
#[derive(Debug, Clone)]
pub struct StubResponse {
    /// HTTP status code
    pub status_code: http::StatusCode,
    /// Response headers (in addition to `Content-Type`, which is derived from
    /// `content_type` when set)
    pub headers: http::HeaderMap,
    /// Response body source
    pub body: StubBody,
    /// `Content-Type` to attach, if any
    pub content_type: Option<String>,
    /// Emission pacing
    pub response_interval: ResponseInterval,
    /// If set, deliver this error instead of a synthesized response
    pub failure_error: Option<StubFailure>,
}

impl Default for StubResponse {
    fn default() -> Self {
        Self {
            status_code: http::StatusCode::OK,
            headers: http::HeaderMap::new(),
            body: StubBody::Bytes(Bytes::new()),
            content_type: None,
            response_interval: ResponseInterval::Immediate,
            failure_error: None,
        }
    }
}

impl StubResponse {
    /// A 200 OK with the given bytes as body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            body: StubBody::Bytes(body.into()),
            ..Self::default()
        }
    }

    /// A response with the given status and no body.
    pub fn status(status_code: http::StatusCode) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    /// A 200 OK that echoes the request back (§4.4 "Echo stub").
    pub fn echo() -> Self {
        Self {
            body: StubBody::Echo,
            ..Self::default()
        }
    }

    /// Set the response's `Content-Type`.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the response's emission pacing.
    pub fn with_interval(mut self, interval: ResponseInterval) -> Self {
        self.response_interval = interval;
        self
    }

    /// Deliver `failure` instead of this response's status/body.
    pub fn with_failure(mut self, failure: StubFailure) -> Self {
        self.failure_error = Some(failure);
        self
    }
}

/// A registered interception rule: a matcher set, ANDed together, plus one
/// [`StubResponse`] per HTTP method it handles (§3, §4.4).
#[derive(Debug, Clone, Default)]
pub struct Stub {
    matchers: Vec<Matcher>,
    responses_by_method: HashMap<http::Method, StubResponse>,
}

impl Stub {
    /// Start building a stub with no matchers and no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a matcher; the stub only matches when all of its matchers match.
    pub fn matching(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Configure the response for a given method.
    pub fn respond(mut self, method: http::Method, response: StubResponse) -> Self {
        self.responses_by_method.insert(method, response);
        self
    }

    /// Configure the same response for every method the caller cares to list.
    pub fn respond_any_method(mut self, methods: &[http::Method], response: StubResponse) -> Self {
        for method in methods {
            self.responses_by_method.insert(method.clone(), response.clone());
        }
        self
    }

    /// Whether every matcher in this stub matches `request`.
    pub fn matches(&self, request: &StubbedRequest) -> bool {
        self.matchers.iter().all(|matcher| matcher.matches(request))
    }

    /// The response configured for `method`, if any.
    pub fn response_for(&self, method: &http::Method) -> Option<&StubResponse> {
        self.responses_by_method.get(method)
    }
}

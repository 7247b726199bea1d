//! Request model

use crate::body::Body;
use crate::security::SecurityPolicy;
use bytes::Bytes;
use http::{HeaderMap, Method};
use http_errors::{HttpError, HttpResult};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// What URL this request targets
#[derive(Debug, Clone)]
pub enum RequestTarget {
    /// A fully qualified URL; the owning client's base URL is ignored entirely.
    Absolute(Url),
    /// A path resolved against the owning client's base URL at fetch time.
    Path(String),
}

/// How redirects are handled
#[derive(Clone)]
pub enum RedirectMode {
    /// Follow redirects using the transport's default behavior
    Follow,
    /// Follow redirects, but resend the original method, headers, and body
    /// rather than whatever the transport would normally do for the new method
    FollowWithOriginalSettings,
    /// Delegate the redirect decision to caller-supplied logic
    FollowCustom(Arc<dyn Fn(&Request, u16, &HeaderMap) -> Option<Request> + Send + Sync>),
    /// Do not follow redirects; return the 3xx response unchanged
    Refuse,
}

impl fmt::Debug for RedirectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectMode::Follow => f.write_str("Follow"),
            RedirectMode::FollowWithOriginalSettings => {
                f.write_str("FollowWithOriginalSettings")
            }
            RedirectMode::FollowCustom(_) => f.write_str("FollowCustom(<fn>)"),
            RedirectMode::Refuse => f.write_str("Refuse"),
        }
    }
}

impl Default for RedirectMode {
    fn default() -> Self {
        RedirectMode::Follow
    }
}

/// Whether a request is collected in memory or streamed to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Collect the response body in memory
    Default,
    /// Stream the response body to a file under the library's temp directory
    LargeData,
}

impl Default for TransferMode {
    fn default() -> Self {
        TransferMode::Default
    }
}

/// Cache interaction policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Use the transport's normal cache behavior
    UseProtocolCachePolicy,
    /// Bypass the cache entirely for this request
    ReloadIgnoringLocalCache,
    /// Use only cached data; fail rather than hit the network
    ReturnCacheDataDontLoad,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::UseProtocolCachePolicy
    }
}

/// Scheduling priority hint passed through to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// High priority
    High,
    /// Default/automatic priority
    Auto,
    /// Low priority
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Auto
    }
}

/// Bytes captured from a prematurely-ended `largeData` download, used to resume
/// a subsequent attempt.
#[derive(Debug, Clone)]
pub struct PartialData {
    /// The resumable bytes themselves
    pub bytes: Bytes,
    /// Deterministic file name this partial data was (or will be) persisted under
    pub file_name: Option<String>,
}

/// A hook that rewrites a fully-built request before it is dispatched
pub type UrlRequestModifier = Arc<dyn Fn(Request) -> Request + Send + Sync>;

/// An HTTP request
///
/// Built via [`RequestBuilder`]; immutable once constructed. Retrying a request
/// produces a new value via [`Request::next_attempt`] rather than mutating this one
/// in place, keeping the retry loop a pure function of `(request, response)`.
#[derive(Clone)]
pub struct Request {
    /// What this request targets
    pub target: RequestTarget,
    /// HTTP method
    pub method: Method,
    /// Request-specific headers; merged over the client's default headers
    pub headers: HeaderMap,
    /// Request-specific query items; appended after the client's default query items
    pub query: Vec<(String, String)>,
    /// Request body
    pub body: Body,
    /// Per-request timeout override; `None` means use the client default
    pub timeout: Option<std::time::Duration>,
    /// Maximum number of retries this request may use
    pub max_retries: u32,
    /// Number of retries already performed
    pub current_retry: u32,
    /// Redirect handling
    pub redirect_mode: RedirectMode,
    /// Memory vs. file transfer mode
    pub transfer_mode: TransferMode,
    /// Cache interaction policy
    pub cache_policy: CachePolicy,
    /// Resume state for a `largeData` transfer
    pub partial_data: Option<PartialData>,
    /// Per-request security policy override; falls back to the client's if `None`
    pub security: Option<SecurityPolicy>,
    /// Hook to rewrite the fully-built request before dispatch
    pub url_request_modifier: Option<UrlRequestModifier>,
    /// Scheduling priority
    pub priority: Priority,
    /// Whether this request is itself the side-effect of a retry strategy
    /// (e.g. a token-refresh request). Alt-requests bypass retry machinery
    /// entirely to avoid infinite recursion (§4.3).
    pub is_alt_request: bool,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("current_retry", &self.current_retry)
            .field("max_retries", &self.max_retries)
            .field("transfer_mode", &self.transfer_mode)
            .field("is_alt_request", &self.is_alt_request)
            .finish()
    }
}

impl Request {
    /// Start building a request targeting an absolute URL
    pub fn builder(method: Method, target: RequestTarget) -> RequestBuilder {
        RequestBuilder::new(method, target)
    }

    /// Whether this request's target is an absolute URL (client base URL ignored)
    pub fn is_absolute(&self) -> bool {
        matches!(self.target, RequestTarget::Absolute(_))
    }

    /// Produce the [`Request`] value for the next retry attempt: increments
    /// `current_retry`, and optionally attaches resume state.
    ///
    /// Returns an error if the retry budget (`max_retries`) is already exhausted.
    pub fn next_attempt(&self) -> HttpResult<Request> {
        if self.current_retry >= self.max_retries {
            return Err(HttpError::Internal(
                "next_attempt called with no retry budget remaining".to_string(),
            ));
        }
        let mut next = self.clone();
        next.current_retry += 1;
        Ok(next)
    }

    /// Produce a copy of this request with resume state attached for a subsequent
    /// `largeData` attempt. Per the invariant in §3, attaching partial data forces
    /// `transfer_mode` to `LargeData`.
    pub fn with_partial_data(&self, partial: PartialData) -> Request {
        let mut next = self.clone();
        next.transfer_mode = TransferMode::LargeData;
        next.partial_data = Some(partial);
        next
    }

    /// Mark this request as an alt-request (a retry-strategy side effect such as a
    /// token refresh). Alt-requests never themselves trigger retries.
    pub fn as_alt_request(&self) -> Request {
        let mut next = self.clone();
        next.is_alt_request = true;
        next.max_retries = 0;
        next.current_retry = 0;
        next
    }
}

/// Builder for [`Request`]
pub struct RequestBuilder {
    target: RequestTarget,
    method: Method,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Body,
    timeout: Option<std::time::Duration>,
    max_retries: u32,
    redirect_mode: RedirectMode,
    transfer_mode: TransferMode,
    cache_policy: CachePolicy,
    partial_data: Option<PartialData>,
    security: Option<SecurityPolicy>,
    url_request_modifier: Option<UrlRequestModifier>,
    priority: Priority,
}

impl RequestBuilder {
    /// Start a new builder for the given method and target
    pub fn new(method: Method, target: RequestTarget) -> Self {
        Self {
            target,
            method,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: Body::Empty,
            timeout: None,
            max_retries: 0,
            redirect_mode: RedirectMode::default(),
            transfer_mode: TransferMode::default(),
            cache_policy: CachePolicy::default(),
            partial_data: None,
            security: None,
            url_request_modifier: None,
            priority: Priority::default(),
        }
    }

    /// Convenience constructor for an absolute-URL request
    pub fn to_url(method: Method, url: Url) -> Self {
        Self::new(method, RequestTarget::Absolute(url))
    }

    /// Convenience constructor for a path resolved against the client's base URL
    pub fn to_path(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, RequestTarget::Path(path.into()))
    }

    /// Set a header, overriding any existing value with the same name
    pub fn header(mut self, name: http::header::HeaderName, value: http::header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set the request body
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Override the client's default timeout for this request
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the redirect handling mode
    pub fn redirect_mode(mut self, mode: RedirectMode) -> Self {
        self.redirect_mode = mode;
        self
    }

    /// Set the transfer mode
    pub fn transfer_mode(mut self, mode: TransferMode) -> Self {
        self.transfer_mode = mode;
        self
    }

    /// Set the cache policy
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Attach resume state, forcing `transfer_mode` to `LargeData`
    pub fn partial_data(mut self, partial: PartialData) -> Self {
        self.transfer_mode = TransferMode::LargeData;
        self.partial_data = Some(partial);
        self
    }

    /// Override the security policy for this request only
    pub fn security(mut self, policy: SecurityPolicy) -> Self {
        self.security = Some(policy);
        self
    }

    /// Attach a hook to rewrite the fully-built request before dispatch
    pub fn url_request_modifier(mut self, modifier: UrlRequestModifier) -> Self {
        self.url_request_modifier = Some(modifier);
        self
    }

    /// Set the scheduling priority
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Finalize the request
    ///
    /// Validates the §3 invariant that `transfer_mode == LargeData` whenever
    /// `partial_data` is set (the builder already enforces this on the happy path,
    /// but a caller may have constructed a `Request` by hand downstream).
    pub fn build(self) -> HttpResult<Request> {
        if self.partial_data.is_some() && self.transfer_mode != TransferMode::LargeData {
            return Err(HttpError::FailedBuildingRequest(
                "partial_data requires transfer_mode = LargeData".to_string(),
            ));
        }
        let request = Request {
            target: self.target,
            method: self.method,
            headers: self.headers,
            query: self.query,
            body: self.body,
            timeout: self.timeout,
            max_retries: self.max_retries,
            current_retry: 0,
            redirect_mode: self.redirect_mode,
            transfer_mode: self.transfer_mode,
            cache_policy: self.cache_policy,
            partial_data: self.partial_data,
            security: self.security,
            url_request_modifier: self.url_request_modifier,
            priority: self.priority,
            is_alt_request: false,
        };
        let request = if let Some(modifier) = request.url_request_modifier.clone() {
            modifier(request)
        } else {
            request
        };
        Ok(request)
    }
}

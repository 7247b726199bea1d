//! Client configuration (§3 "Client", §4.1)

use http::HeaderMap;
use http_types::{CachePolicy, RedirectMode, SecurityPolicy};
use std::time::Duration;
use url::Url;

/// Client-wide defaults merged into every request composed by a [`crate::Client`]
/// (§4.1): a documented `Default` plus fluent setters.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL requests with a path-only target are resolved against
    pub base_url: Option<Url>,
    /// Headers merged under every request's own headers
    pub default_headers: HeaderMap,
    /// Query items prepended to every request's own query items
    pub default_query: Vec<(String, String)>,
    /// Default per-request timeout; overridden by a request's own `timeout`
    pub default_timeout: Duration,
    /// Default redirect handling; overridden by a request's own `redirect_mode`
    pub default_redirect_mode: RedirectMode,
    /// Default cache policy; overridden by a request's own `cache_policy`
    pub default_cache_policy: CachePolicy,
    /// Security policy applied when a request has no per-request override
    pub security: SecurityPolicy,
    /// Upper bound on in-flight transport tasks across all fetches sharing
    /// this client (§5 "the client's maximum concurrent operations")
    pub max_concurrent_operations: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            default_query: Vec::new(),
            default_timeout: Duration::from_secs(60),
            default_redirect_mode: RedirectMode::default(),
            default_cache_policy: CachePolicy::default(),
            security: SecurityPolicy::default(),
            max_concurrent_operations: 6,
        }
    }
}

impl ClientConfig {
    /// Set the base URL
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set a default header, overriding any existing value with the same name
    pub fn with_header(mut self, name: http::header::HeaderName, value: http::header::HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Append a default query item
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_query.push((key.into(), value.into()));
        self
    }

    /// Override the default per-request timeout
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Override the security policy
    pub fn with_security(mut self, security: SecurityPolicy) -> Self {
        self.security = security;
        self
    }

    /// Override the maximum number of concurrent in-flight operations
    pub fn with_max_concurrent_operations(mut self, max: usize) -> Self {
        self.max_concurrent_operations = max;
        self
    }
}

//! Request matchers (§4.4): the predicates a [`crate::Stub`] ANDs together to
//! decide whether it applies to an outbound [`StubbedRequest`].

use bytes::Bytes;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A snapshot of the outbound request the stubber evaluates matchers against.
///
/// Built once per intercepted [`http_transport::TransportTask`], after its body
/// (if any) has been collected into memory — matching on body content requires
/// having the bytes in hand, and the echo/dynamic response providers need the
/// same bytes, so the stubber reads the body exactly once per attempt.
#[derive(Debug, Clone)]
pub struct StubbedRequest {
    /// HTTP method
    pub method: http::Method,
    /// Requested URL
    pub url: Url,
    /// Request headers
    pub headers: http::HeaderMap,
    /// Fully-collected request body
    pub body: Bytes,
}

/// A predicate over a [`StubbedRequest`]; a [`crate::Stub`] matches when every
/// one of its matchers returns true (§4.4 "AND-composed").
#[derive(Clone)]
pub enum Matcher {
    /// The request URL (as a string) matches a regular expression
    UrlRegex(Regex),
    /// The request URL equals `exact`, modulo the given comparison options
    Url {
        /// The URL to compare against
        exact: Url,
        /// Ignore the path component of both URLs when comparing
        ignore_path: bool,
        /// Ignore the query string of both URLs when comparing
        ignore_query_parameters: bool,
    },
    /// An RFC 6570 URI template, approximated by translating `{var}` segments
    /// into single-path-segment wildcards and anchoring the rest literally.
    UriTemplate(UriTemplateMatcher),
    /// The request body, parsed as JSON, equals `value` (order-independent for
    /// objects; `serde_json::Value`'s own `PartialEq` already has this property).
    JsonObject(serde_json::Value),
    /// The request body equals `exact`, byte for byte
    Body(Bytes),
    /// An escape hatch for predicates the other variants can't express.
    CustomPredicate(Arc<dyn Fn(&StubbedRequest) -> bool + Send + Sync>),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::UrlRegex(re) => f.debug_tuple("UrlRegex").field(&re.as_str()).finish(),
            Matcher::Url {
                exact,
                ignore_path,
                ignore_query_parameters,
            } => f
                .debug_struct("Url")
                .field("exact", exact)
                .field("ignore_path", ignore_path)
                .field("ignore_query_parameters", ignore_query_parameters)
                .finish(),
            Matcher::UriTemplate(t) => f.debug_tuple("UriTemplate").field(&t.template).finish(),
            Matcher::JsonObject(v) => f.debug_tuple("JsonObject").field(v).finish(),
            Matcher::Body(b) => f
                .debug_tuple("Body")
                .field(&format!("{} bytes", b.len()))
                .finish(),
            Matcher::CustomPredicate(_) => f.debug_tuple("CustomPredicate").field(&"<fn>").finish(),
        }
    }
}

impl Matcher {
    /// Build a [`Matcher::UrlRegex`] from a pattern string.
    pub fn url_regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Matcher::UrlRegex(Regex::new(pattern)?))
    }

    /// Build a [`Matcher::Url`] requiring an exact match on every component.
    pub fn url_exact(exact: Url) -> Self {
        Matcher::Url {
            exact,
            ignore_path: false,
            ignore_query_parameters: false,
        }
    }

    /// Build a [`Matcher::UriTemplate`] matcher.
    pub fn uri_template(template: impl Into<String>) -> Self {
        Matcher::UriTemplate(UriTemplateMatcher::new(template.into()))
    }

    /// Build a [`Matcher::CustomPredicate`] from a closure.
    pub fn custom(predicate: impl Fn(&StubbedRequest) -> bool + Send + Sync + 'static) -> Self {
        Matcher::CustomPredicate(Arc::new(predicate))
    }

    /// Evaluate this matcher against a request.
    pub fn matches(&self, request: &StubbedRequest) -> bool {
        match self {
            Matcher::UrlRegex(re) => re.is_match(request.url.as_str()),
            Matcher::Url {
                exact,
                ignore_path,
                ignore_query_parameters,
            } => url_equal(&request.url, exact, *ignore_path, *ignore_query_parameters),
            Matcher::UriTemplate(template) => template.matches(request.url.path()),
            Matcher::JsonObject(expected) => match serde_json::from_slice::<serde_json::Value>(&request.body)
            {
                Ok(actual) => &actual == expected,
                Err(_) => false,
            },
            Matcher::Body(exact) => &request.body == exact,
            Matcher::CustomPredicate(predicate) => predicate(request),
        }
    }
}

fn url_equal(actual: &Url, exact: &Url, ignore_path: bool, ignore_query: bool) -> bool {
    if actual.scheme() != exact.scheme() || actual.host_str() != exact.host_str() || actual.port() != exact.port() {
        return false;
    }
    if !ignore_path && actual.path() != exact.path() {
        return false;
    }
    if !ignore_query && actual.query() != exact.query() {
        return false;
    }
    true
}

/// A coarse RFC 6570 "level 1" approximation: each `{name}` placeholder matches
/// exactly one non-`/` path segment; everything else in the template must match
/// literally. Good enough for the common `/users/{id}` shape this library's
/// stubbing scenarios need; it does not implement reserved-expansion, query
/// templates, or multi-segment (`{+path}`) operators.
#[derive(Clone)]
pub struct UriTemplateMatcher {
    template: String,
    pattern: Regex,
}

impl UriTemplateMatcher {
    /// Compile a URI template into its approximated matcher.
    pub fn new(template: String) -> Self {
        let mut pattern = String::from("^");
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '{' {
                for next in chars.by_ref() {
                    if next == '}' {
                        break;
                    }
                }
                pattern.push_str("[^/]+");
            } else {
                pattern.push_str(&regex::escape(&c.to_string()));
            }
        }
        pattern.push('$');
        let pattern = Regex::new(&pattern).expect("generated URI template pattern is valid regex");
        Self { template, pattern }
    }

    /// Whether `path` matches this template.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

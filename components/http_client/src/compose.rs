//! Request composition (§4.1): URL resolution and header/query merging applied
//! once, up front, by [`crate::Client::fetch`] before the retry engine takes
//! over. The retry engine re-resolves the URL on each attempt (a request's
//! target doesn't change across retries, so this is cheap and idempotent) via
//! the [`http_validators::UrlResolver`] built here.

use crate::config::ClientConfig;
use crate::cookie_jar::CookieJar;
use http::HeaderMap;
use http_errors::{HttpError, HttpResult};
use http_types::{Request, RequestTarget};
use url::Url;

/// Merge client default headers under request headers, request values
/// overriding on name match (case-insensitive, per [`http::HeaderName`]).
pub fn merge_headers(client_headers: &HeaderMap, request_headers: &HeaderMap) -> HeaderMap {
    let mut merged = client_headers.clone();
    let mut overridden = std::collections::HashSet::new();
    for (name, value) in request_headers.iter() {
        if overridden.insert(name.clone()) {
            merged.remove(name);
        }
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// Prepend client default query items to the request's own, preserving order.
pub fn merge_query(
    client_query: &[(String, String)],
    request_query: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = client_query.to_vec();
    merged.extend_from_slice(request_query);
    merged
}

fn apply_default_headers(headers: &mut HeaderMap) {
    if !headers.contains_key(http::header::ACCEPT_ENCODING) {
        headers.insert(
            http::header::ACCEPT_ENCODING,
            http::HeaderValue::from_static("gzip, deflate"),
        );
    }
    if !headers.contains_key(http::header::ACCEPT_LANGUAGE) {
        headers.insert(
            http::header::ACCEPT_LANGUAGE,
            http::HeaderValue::from_static("en-US,en;q=0.9"),
        );
    }
    if !headers.contains_key(http::header::USER_AGENT) {
        headers.insert(
            http::header::USER_AGENT,
            http::HeaderValue::from_static(concat!("http-client/", env!("CARGO_PKG_VERSION"))),
        );
    }
}

fn join_path(base: &Url, path: &str) -> Url {
    let mut joined = base.clone();
    let base_path = joined.path().trim_end_matches('/').to_string();
    let suffix = path.trim_start_matches('/');
    joined.set_path(&format!("{base_path}/{suffix}"));
    joined
}

/// Resolve `request`'s target to an absolute URL, applying its already-merged
/// query items. Used both by [`compose`] and as the [`http_validators::UrlResolver`]
/// the retry engine calls on every attempt.
pub fn resolve_url(base_url: Option<&Url>, request: &Request) -> HttpResult<Url> {
    let mut url = match &request.target {
        RequestTarget::Absolute(url) => url.clone(),
        RequestTarget::Path(path) => {
            let base = base_url.ok_or_else(|| {
                HttpError::InvalidUrl(
                    "request targets a path but the client has no base URL configured".to_string(),
                )
            })?;
            join_path(base, path)
        }
    };
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &request.query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Compose a caller-built request into its dispatch-ready form: merge the
/// client's default headers/query (§4.1), apply the ambient default headers,
/// resolve the absolute URL, and attach a `Cookie` header from the jar if the
/// request didn't already set one.
pub fn compose(
    config: &ClientConfig,
    cookie_jar: &dyn CookieJar,
    request: Request,
) -> HttpResult<(Request, Url)> {
    let mut composed = request;
    composed.headers = merge_headers(&config.default_headers, &composed.headers);
    apply_default_headers(&mut composed.headers);
    composed.query = merge_query(&config.default_query, &composed.query);

    let url = resolve_url(config.base_url.as_ref(), &composed)?;

    if !composed.headers.contains_key(http::header::COOKIE) {
        if let Some(cookie) = cookie_jar.cookie_header_for(&url) {
            composed.headers.insert(http::header::COOKIE, cookie);
        }
    }

    Ok((composed, url))
}

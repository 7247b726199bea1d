//! Authentication-challenge construction and credential application (§4.2 step 5)

use base64::Engine;
use http::HeaderMap;
use http_types::{AuthChallenge, Credential};
use url::Url;

/// Build an [`AuthChallenge`] from a `401` response's `WWW-Authenticate` header.
///
/// Returns `None` if the response carries no such header, in which case the loader
/// should treat the `401` as an ordinary response rather than a challenge.
pub fn challenge_from_response(headers: &HeaderMap, url: &Url, previous_failure_count: u32) -> Option<AuthChallenge> {
    let raw = headers.get(http::header::WWW_AUTHENTICATE)?.to_str().ok()?;
    let scheme = raw.split_whitespace().next().unwrap_or("Basic").to_string();
    let realm = raw
        .split("realm=")
        .nth(1)
        .map(|rest| rest.trim_matches('"').trim_matches(',').trim().to_string());
    Some(AuthChallenge {
        scheme,
        realm,
        host: url.host_str().unwrap_or_default().to_string(),
        port: url.port_or_known_default().unwrap_or(0),
        previous_failure_count,
    })
}

/// Render a `Basic` `Authorization` header value for the given credential.
pub fn basic_auth_header_value(credential: &Credential) -> String {
    let raw = format!("{}:{}", credential.username, credential.password);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

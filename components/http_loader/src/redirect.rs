//! Redirect-mode handling (§4.2 step 4)

use http::HeaderMap;
use http_types::{Body, RedirectMode, Request, RequestTarget};
use url::Url;

/// Decide the next request to issue for a redirect response, if any.
///
/// Returns `None` when the status is not a redirect, `redirect_mode` is
/// [`RedirectMode::Refuse`], there is no (or an unparseable) `Location` header, or a
/// [`RedirectMode::FollowCustom`] callback declines to continue.
pub fn next_redirect_request(
    request: &Request,
    current_url: &Url,
    status: u16,
    response_headers: &HeaderMap,
) -> Option<(Request, Url)> {
    if !(300..400).contains(&status) {
        return None;
    }

    match &request.redirect_mode {
        RedirectMode::Refuse => None,
        RedirectMode::FollowCustom(callback) => {
            let next = callback(request, status, response_headers)?;
            let url = resolve_target(&next, current_url, response_headers)?;
            Some((next, url))
        }
        RedirectMode::FollowWithOriginalSettings => {
            let location = location_url(current_url, response_headers)?;
            let mut next = request.clone();
            next.target = RequestTarget::Absolute(location.clone());
            Some((next, location))
        }
        RedirectMode::Follow => {
            let location = location_url(current_url, response_headers)?;
            let mut next = request.clone();
            next.target = RequestTarget::Absolute(location.clone());
            if !matches!(status, 307 | 308) && request.method != http::Method::GET && request.method != http::Method::HEAD {
                next.method = http::Method::GET;
                next.body = Body::Empty;
                next.headers.remove(http::header::CONTENT_TYPE);
                next.headers.remove(http::header::CONTENT_LENGTH);
            }
            Some((next, location))
        }
    }
}

fn location_url(current_url: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(http::header::LOCATION)?.to_str().ok()?;
    current_url.join(location).ok()
}

fn resolve_target(request: &Request, current_url: &Url, headers: &HeaderMap) -> Option<Url> {
    match &request.target {
        RequestTarget::Absolute(url) => Some(url.clone()),
        RequestTarget::Path(_) => location_url(current_url, headers),
    }
}

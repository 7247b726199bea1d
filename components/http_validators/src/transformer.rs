//! Response transformers (§4.3): run after the validator chain's final decision,
//! in insertion order, never as part of the retry loop itself.

use http_types::{Request, Response};
use std::sync::Arc;

/// A post-validation response rewrite.
pub type ResponseTransformer = Arc<dyn Fn(Response, &Request) -> Response + Send + Sync>;

/// Apply every transformer, in order, to `response`.
pub fn apply_transformers(
    transformers: &[ResponseTransformer],
    request: &Request,
    mut response: Response,
) -> Response {
    for transformer in transformers {
        response = transformer(response, request);
    }
    response
}

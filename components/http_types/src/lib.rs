//! http_types component
//!
//! Core data model for the HTTP client: [`Request`]/[`RequestBuilder`], [`Body`],
//! [`Response`], [`Progress`], and the authentication types shared between a request
//! and the client that executes it.
//!
//! The dependency-light leaf crate every other component in this workspace builds on.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod body;
mod progress;
mod request;
mod response;
mod security;

pub use body::{
    ArrayEncoding, Body, BodyStream, BoolEncoding, FormValue, JsonOptions, MultipartPart,
    StreamSource,
};
pub use progress::{Progress, ProgressEvent};
pub use request::{
    CachePolicy, PartialData, Priority, RedirectMode, Request, RequestBuilder, RequestTarget,
    TransferMode, UrlRequestModifier,
};
pub use response::{Metrics, Response, ResponseData, ResponseStatus};
pub use security::{AuthChallenge, ChallengeDisposition, Credential, SecurityPolicy};

pub use http::{HeaderMap, Method};
pub use url::Url;

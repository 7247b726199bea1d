//! http_transport component
//!
//! The abstract `Transport` boundary the data loader drives (§4.2), plus the one
//! concrete production implementation this library ships: a `hyper`/`hyper-util`
//! based client. TLS, DNS, and connection-pooling internals are explicitly out of
//! scope (§1) — this crate depends on whatever `Connect` implementation the caller
//! plugs into [`HyperTransport::with_connector`] rather than taking a position on
//! either.
//!
//! A second `Transport` implementation — the in-process stubber — lives in the
//! `http_stub` crate and is swapped in via the client's configuration, never by
//! monkeypatching this one.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod hyper_transport;
mod task;

pub use hyper_transport::HyperTransport;
pub use task::{ResponseBodyStream, TransportBody, TransportResponse, TransportTask};

use async_trait::async_trait;
use http_errors::HttpResult;

/// Drives exactly one network attempt for a fully-built [`TransportTask`].
///
/// Implementations must not retry, follow redirects, or interpret status codes —
/// all of that is the data loader's and validator chain's job (§4.2, §4.3). A
/// `Transport` only has to turn a task into a response or an error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one attempt of the given task
    async fn execute(&self, task: TransportTask) -> HttpResult<TransportResponse>;
}

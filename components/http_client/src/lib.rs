//! http_client component
//!
//! The session-owning client: request composition (§4.1), the lifecycle
//! delegate, the cookie jar boundary, and the awaitable/cancelable
//! [`FetchHandle`] returned by every fetch.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod client;
mod compose;
mod config;
mod cookie_jar;
mod delegate;
mod fetch_handle;

pub use client::Client;
pub use compose::{merge_headers, merge_query, resolve_url};
pub use config::ClientConfig;
pub use cookie_jar::{CookieJar, NoOpCookieJar};
pub use delegate::{
    ClientDelegate, DidCollectMetricsHandler, DidEnqueueHandler, DidFinishHandler,
    DidReceiveAuthChallengeHandler, TaskIsWaitingForConnectivityHandler, WillRetryWithStrategyHandler,
};
pub use fetch_handle::FetchHandle;

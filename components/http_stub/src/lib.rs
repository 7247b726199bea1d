//! http_stub component
//!
//! The in-process request-interception engine (§4.4): matcher-composed stub
//! registration against a process-wide singleton, response synthesis (fixed,
//! echo, or dynamic), bandwidth/delay simulation, and an `unhandledMode` policy
//! for requests matching nothing. Swapped in for the production `Transport` via
//! the client's configuration (`http_stub::StubTransport` implements
//! `http_transport::Transport`) — never via global monkeypatching of it.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod matcher;
mod registry;
mod stub;
mod transport;

pub use matcher::{Matcher, StubbedRequest, UriTemplateMatcher};
pub use registry::{ScopedStubGuard, StubId, Stubber, StubberHandle, UnhandledMode};
pub use stub::{ResponseInterval, Stub, StubBody, StubFailure, StubResponse};
pub use transport::StubTransport;

//! http_loader component
//!
//! The single-attempt execution engine (§4.2): given an already-composed
//! [`http_types::Request`] and its resolved URL, drives one [`http_transport::Transport`]
//! call (plus internal redirect-following and a single authentication-challenge
//! retry), persists `largeData` bodies to a stable temp-file location, and reports
//! progress via a `tokio::sync::watch` channel.
//!
//! Retrying a failed attempt is the validator chain's job (`http_validators`); this
//! crate only ever drives one logical fetch to its terminal response.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod auth;
mod config;
mod redirect;
mod tempstore;
mod loader;

pub use config::LoaderConfig;
pub use loader::Loader;

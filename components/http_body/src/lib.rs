//! http_body component
//!
//! Serializes [`http_types::Body`] variants into wire bytes plus the headers that
//! should accompany them (`Content-Type`, `Content-Length`), per §4.1's body
//! encoding contracts.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod form;
mod json;
mod multipart;
mod stream;

pub use form::encode_form;
pub use json::encode_json;
pub use multipart::encode_multipart;
pub use stream::body_stream;

use bytes::Bytes;
use http_errors::HttpResult;
use http_types::{Body, BodyStream};

/// The payload half of an encoded body: either fully materialized or a lazy stream
pub enum BodyPayload {
    /// No bytes to send
    Empty,
    /// Fully materialized bytes
    Bytes(Bytes),
    /// A lazily-consumed byte stream
    Stream(BodyStream),
}

/// The result of encoding a [`Body`]: the payload plus the headers the data loader
/// should set unless the caller already supplied them explicitly.
pub struct EncodedBody {
    /// `Content-Type` implied by this body, if any
    pub content_type: Option<String>,
    /// `Content-Length` implied by this body, if known up front
    pub content_length: Option<u64>,
    /// The payload itself
    pub payload: BodyPayload,
}

/// Encode a [`Body`] into wire bytes (or a lazy stream) plus its implied headers.
///
/// This is the single entry point the data loader calls; it dispatches to the
/// per-variant encoder in this crate.
pub async fn encode_body(body: &Body) -> HttpResult<EncodedBody> {
    match body {
        Body::Empty => Ok(EncodedBody {
            content_type: None,
            content_length: Some(0),
            payload: BodyPayload::Empty,
        }),
        Body::Raw(bytes, content_type) => Ok(EncodedBody {
            content_type: content_type.clone(),
            content_length: Some(bytes.len() as u64),
            payload: BodyPayload::Bytes(bytes.clone()),
        }),
        Body::Text(text, content_type) => {
            let bytes = Bytes::from(text.clone().into_bytes());
            Ok(EncodedBody {
                content_type: Some(
                    content_type
                        .clone()
                        .unwrap_or_else(|| "text/plain".to_string()),
                ),
                content_length: Some(bytes.len() as u64),
                payload: BodyPayload::Bytes(bytes),
            })
        }
        Body::Json(value, options) => {
            let bytes = encode_json(value, *options)?;
            Ok(EncodedBody {
                content_type: Some("application/json".to_string()),
                content_length: Some(bytes.len() as u64),
                payload: BodyPayload::Bytes(bytes),
            })
        }
        Body::FormUrlEncoded(fields, array_encoding, bool_encoding) => {
            let bytes = encode_form(fields, *array_encoding, *bool_encoding)?;
            Ok(EncodedBody {
                content_type: Some("application/x-www-form-urlencoded".to_string()),
                content_length: Some(bytes.len() as u64),
                payload: BodyPayload::Bytes(bytes),
            })
        }
        Body::Stream(source, content_type) => {
            let (stream, length) = body_stream(source).await?;
            Ok(EncodedBody {
                content_type: content_type.clone(),
                content_length: length,
                payload: BodyPayload::Stream(stream),
            })
        }
        Body::Multipart {
            boundary,
            parts,
            preamble,
        } => {
            let bytes = encode_multipart(boundary, parts, preamble.as_deref()).await?;
            Ok(EncodedBody {
                content_type: Some(format!("multipart/form-data; boundary={boundary}")),
                content_length: Some(bytes.len() as u64),
                payload: BodyPayload::Bytes(bytes),
            })
        }
        Body::Custom(encoder) => {
            let (bytes, content_type) = encoder()?;
            Ok(EncodedBody {
                content_type,
                content_length: Some(bytes.len() as u64),
                payload: BodyPayload::Bytes(bytes),
            })
        }
    }
}

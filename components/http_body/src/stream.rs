//! Streamed body encoding
//!
//! Unlike the other encoders, a stream body is consumed lazily by the transport
//! (§4.1: "encoder sets only `Content-Type`... the transport consumes bytes
//! lazily"). This module only resolves a [`StreamSource`] into a fresh [`BodyStream`]
//! plus its known length, if any.

use bytes::Bytes;
use http_errors::{HttpError, HttpResult};
use http_types::{BodyStream, StreamSource};
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// Resolve a [`StreamSource`] into a lazily-consumed byte stream and its known
/// length, if any. Called once per transport attempt so that `File` and `Bytes`
/// sources (both cheaply `Clone`) and `Dynamic` factories all produce a *fresh*
/// stream on retry, per §4.2 point 6.
pub async fn body_stream(source: &StreamSource) -> HttpResult<(BodyStream, Option<u64>)> {
    match source {
        StreamSource::Bytes(bytes) => {
            let length = bytes.len() as u64;
            let bytes = bytes.clone();
            let stream = futures::stream::once(async move { Ok(bytes) });
            Ok((Box::pin(stream), Some(length)))
        }
        StreamSource::File(path) => {
            let metadata = tokio::fs::metadata(path)
                .await
                .map_err(|e| HttpError::MultipartInvalidFile(format!("{}: {e}", path.display())))?;
            let length = metadata.len();
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| HttpError::MultipartInvalidFile(format!("{}: {e}", path.display())))?;
            let stream = futures::stream::unfold(file, |mut file| async move {
                let mut buf = vec![0u8; CHUNK_SIZE];
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        Some((Ok(Bytes::from(buf)), file))
                    }
                    Err(e) => Some((Err(e), file)),
                }
            });
            Ok((Box::pin(stream), Some(length)))
        }
        StreamSource::Dynamic { length, factory } => Ok((factory(), *length)),
    }
}

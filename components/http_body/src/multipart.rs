//! Multipart/form-data body encoding
//!
//! Produces the bit-exact wire framing documented in §6:
//!
//! ```text
//! [preamble CRLF CRLF]?
//! (--boundary CRLF
//!  (HeaderName: HeaderValue CRLF)+
//!  CRLF
//!  <part-bytes>
//!  CRLF)+
//! --boundary-- CRLF
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use futures::TryStreamExt;
use http_errors::{HttpError, HttpResult};
use http_types::{MultipartPart, StreamSource};

const CRLF: &[u8] = b"\r\n";

/// Encode a full multipart body, eagerly reading file and dynamic-stream parts into
/// memory so the resulting `Content-Length` and wire bytes are exact. Large-file
/// streaming multipart uploads are a known simplification — see DESIGN.md.
pub async fn encode_multipart(
    boundary: &str,
    parts: &[MultipartPart],
    preamble: Option<&str>,
) -> HttpResult<Bytes> {
    validate_boundary(boundary)?;
    let mut out = BytesMut::new();

    if let Some(preamble) = preamble {
        out.put(preamble.as_bytes());
        out.put(CRLF);
        out.put(CRLF);
    }

    for part in parts {
        out.put_slice(b"--");
        out.put(boundary.as_bytes());
        out.put(CRLF);

        for (name, value) in part_headers(part)? {
            out.put(name.as_bytes());
            out.put_slice(b": ");
            out.put(value.as_bytes());
            out.put(CRLF);
        }
        out.put(CRLF);

        let bytes = read_part_bytes(part).await?;
        out.put(bytes);
        out.put(CRLF);
    }

    out.put_slice(b"--");
    out.put(boundary.as_bytes());
    out.put_slice(b"--");
    out.put(CRLF);

    Ok(out.freeze())
}

fn validate_boundary(boundary: &str) -> HttpResult<()> {
    if boundary.is_empty() || boundary.contains("\r") || boundary.contains("\n") {
        return Err(HttpError::MultipartEncodingFailed(
            "boundary must be non-empty and free of CR/LF".to_string(),
        ));
    }
    Ok(())
}

fn part_headers(part: &MultipartPart) -> HttpResult<Vec<(String, String)>> {
    let mut headers = Vec::new();

    let mut disposition = format!("form-data; name=\"{}\"", escape_header_value(&part.name));
    if let Some(filename) = &part.filename {
        disposition.push_str(&format!("; filename=\"{}\"", escape_header_value(filename)));
    }
    headers.push(("Content-Disposition".to_string(), disposition));

    if let Some(content_type) = &part.content_type {
        headers.push(("Content-Type".to_string(), content_type.clone()));
    }

    for (name, value) in &part.extra_headers {
        if name.contains('\r') || name.contains('\n') || value.contains('\r') || value.contains('\n') {
            return Err(HttpError::MultipartEncodingFailed(format!(
                "header '{name}' contains CR/LF"
            )));
        }
        headers.push((name.clone(), value.clone()));
    }

    Ok(headers)
}

fn escape_header_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

async fn read_part_bytes(part: &MultipartPart) -> HttpResult<Bytes> {
    match &part.source {
        StreamSource::Bytes(bytes) => Ok(bytes.clone()),
        StreamSource::File(path) => tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|e| HttpError::MultipartInvalidFile(format!("{}: {e}", path.display()))),
        StreamSource::Dynamic { factory, .. } => {
            let stream = factory();
            let chunks: Vec<Bytes> = stream
                .try_collect()
                .await
                .map_err(|e| HttpError::MultipartStreamReadFailed(e.to_string()))?;
            let mut buf = BytesMut::new();
            for chunk in chunks {
                buf.put(chunk);
            }
            Ok(buf.freeze())
        }
    }
}

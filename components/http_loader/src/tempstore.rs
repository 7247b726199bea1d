//! Deterministic on-disk storage for `largeData` response bodies and resumable
//! partial-download bytes (§4.2, §6 "Persisted state").

use bytes::Bytes;
use http::Method;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use url::Url;

/// Deterministic file name for a request, keyed by method + URL so repeated
/// attempts against the same request land on the same path.
pub fn deterministic_file_name(method: &Method, url: &Url) -> String {
    let mut hasher = DefaultHasher::new();
    method.as_str().hash(&mut hasher);
    url.as_str().hash(&mut hasher);
    format!("{:016x}.bin", hasher.finish())
}

/// Persist bytes under `dir/file_name`, creating `dir` if necessary.
pub async fn persist_bytes(dir: &Path, file_name: &str, bytes: &Bytes) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

//! Data loader configuration

use std::path::PathBuf;

/// Configuration for a [`crate::Loader`]: a documented `Default` plus builder
/// setters.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory `largeData` responses are persisted under
    pub temp_dir: PathBuf,
    /// Maximum number of redirects followed before giving up and returning the
    /// last 3xx response unchanged (no dedicated error category — §9 design note
    /// on the redirect loop safety cap).
    pub max_redirects: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir().join("http_loader"),
            max_redirects: 20,
        }
    }
}

impl LoaderConfig {
    /// Override the temp directory downloads are persisted under
    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Override the redirect cap
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

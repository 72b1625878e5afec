//! Pipeline configuration, loaded once at startup and read-only after.

use std::path::PathBuf;
use std::time::Duration;

use crate::cleanup::DEFAULT_CLEANUP_DELAY;
use crate::limits::DEFAULT_MAX_CHAR_COUNT;

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Document character ceiling (`MAX_CHAR_COUNT`).
    pub max_chars: usize,
    /// Root directory for per-submission artifacts (`STORAGE_ROOT`).
    pub storage_root: PathBuf,
    /// Analyzer service endpoint (`ANALYZER_URL`).
    pub analyzer_url: String,
    /// Analyzer bearer key (`ANALYZER_API_KEY`).
    pub analyzer_api_key: String,
    /// Artifact retention window (`CLEANUP_DELAY_SECS`).
    pub cleanup_delay: Duration,
    /// Optional override for download link construction (`PUBLIC_BASE_URL`).
    /// When unset, links are built from request headers.
    pub base_url: Option<String>,
}

impl AnalyzeConfig {
    /// Load configuration from environment variables, with defaults
    /// suitable for local development.
    pub fn from_env() -> Self {
        let max_chars = std::env::var("MAX_CHAR_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CHAR_COUNT);

        let storage_root = std::env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/submissions"));

        let cleanup_delay = std::env::var("CLEANUP_DELAY_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CLEANUP_DELAY);

        Self {
            max_chars,
            storage_root,
            analyzer_url: std::env::var("ANALYZER_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1/analyze".to_string()),
            analyzer_api_key: std::env::var("ANALYZER_API_KEY").unwrap_or_default(),
            cleanup_delay,
            base_url: std::env::var("PUBLIC_BASE_URL").ok().filter(|v| !v.is_empty()),
        }
    }
}

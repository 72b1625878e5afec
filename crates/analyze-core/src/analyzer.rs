//! Boundary to the external structure-analysis service.
//!
//! The analysis itself is an opaque AI capability. This module only owns
//! the request shape sent to it and the single-call, no-retry contract:
//! the upstream call is billed and not idempotent, so a transient failure
//! is reported to the caller instead of being retried.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::AnalyzeError;

/// Minimal document shape sent to the analyzer as a hint.
///
/// Built solely from the first line of the raw text; never treated as
/// authoritative structure.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSeed {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub sections: Vec<String>,
}

impl DocumentSeed {
    pub fn from_text(text: &str) -> Self {
        let first_line = text.lines().next().unwrap_or("").trim();
        let title = if first_line.is_empty() {
            "Untitled".to_string()
        } else {
            first_line.to_string()
        };

        Self {
            title,
            abstract_text: String::new(),
            sections: Vec::new(),
        }
    }
}

/// External structure-analysis capability.
///
/// Invoked at most once per submission. Any failure mode (timeout,
/// upstream error, malformed response) surfaces as a single
/// [`AnalyzeError::Analysis`].
#[async_trait]
pub trait StructureAnalyzer: Send + Sync {
    async fn analyze(&self, seed: &DocumentSeed, text: &str) -> Result<Value, AnalyzeError>;
}

/// HTTP client for the analyzer service.
pub struct HttpAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpAnalyzer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl StructureAnalyzer for HttpAnalyzer {
    async fn analyze(&self, seed: &DocumentSeed, text: &str) -> Result<Value, AnalyzeError> {
        debug!("Calling analyzer at {} (title: '{}')", self.endpoint, seed.title);

        let body = serde_json::json!({
            "seed": seed,
            "text": text,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Analyzer request failed: {}", e);
                AnalyzeError::Analysis(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Analyzer returned {}: {}", status, detail);
            return Err(AnalyzeError::Analysis(format!(
                "analyzer returned {}",
                status
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AnalyzeError::Analysis(format!("malformed analyzer response: {}", e)))
    }
}

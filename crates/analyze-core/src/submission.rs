//! Submission identity and per-request state.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique identifier for one analysis submission.
///
/// Minted exactly once per accepted request and never reused. Artifact
/// paths and cleanup are namespaced by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Mint a fresh id of the form `sub_<unix-millis><6 random digits>`.
    ///
    /// The random suffix keeps ids distinct when multiple requests arrive
    /// within the same clock millisecond.
    pub fn mint() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("sub_{}{:06}", millis, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Submission lifecycle as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Completed,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One submission as mirrored by the client-side store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: SubmissionId,
    pub date: DateTime<Utc>,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub status: SubmissionStatus,
    /// Analysis result once complete; opaque to this crate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

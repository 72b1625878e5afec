//! Client-side submission history store.
//!
//! The server keeps no history; clients mirror their own submissions in
//! local storage. The backend is injectable so the store can run against
//! browser-local storage in a client build and plain memory in tests.

use serde_json::Value;
use std::collections::HashMap;

use crate::submission::{StoredSubmission, SubmissionStatus};

/// Well-known key the submission list is serialized under.
pub const STORAGE_KEY: &str = "document_submissions";

/// Minimal key-value storage surface (the shape of browser localStorage).
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// Pure in-memory backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Keyed list of submissions persisted through a [`StorageBackend`].
pub struct SubmissionStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> SubmissionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// All stored submissions, newest first. Corrupt or missing data
    /// loads as an empty list rather than an error.
    pub fn load(&self) -> Vec<StoredSubmission> {
        self.backend
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&mut self, submissions: &[StoredSubmission]) {
        if let Ok(raw) = serde_json::to_string(submissions) {
            self.backend.set(STORAGE_KEY, raw);
        }
    }

    /// Prepend a submission to the history.
    pub fn add(&mut self, submission: StoredSubmission) {
        let mut all = self.load();
        all.insert(0, submission);
        self.save(&all);
    }

    pub fn get(&self, id: &str) -> Option<StoredSubmission> {
        self.load().into_iter().find(|s| s.id.as_str() == id)
    }

    /// Record a completed analysis for an existing entry. Returns false
    /// when the id is unknown.
    pub fn update(&mut self, id: &str, status: SubmissionStatus, result: Option<Value>) -> bool {
        let mut all = self.load();
        let Some(entry) = all.iter_mut().find(|s| s.id.as_str() == id) else {
            return false;
        };
        entry.status = status;
        if result.is_some() {
            entry.result = result;
        }
        self.save(&all);
        true
    }

    /// Drop the entire history.
    pub fn clear(&mut self) {
        self.backend.remove(STORAGE_KEY);
    }
}

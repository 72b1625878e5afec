//! Deferred deletion of submission artifacts.
//!
//! Cleanup is fire-and-forget: the response path never awaits it, and a
//! process restart loses pending schedules. That is the accepted
//! guarantee: artifacts are retention-limited, not durably queued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::storage::ArtifactStore;
use crate::submission::SubmissionId;

/// Default retention window: 24 hours.
pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Schedules time-delayed deletion of a submission's artifact namespace.
#[derive(Clone)]
pub struct CleanupScheduler {
    store: ArtifactStore,
    delay: Duration,
    tasks: Arc<Mutex<HashMap<SubmissionId, JoinHandle<()>>>>,
}

impl CleanupScheduler {
    pub fn new(store: ArtifactStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register deferred deletion of everything under `id`.
    ///
    /// Calling again for the same id resets the timer; it never errors
    /// and never double-deletes.
    pub fn schedule(&self, id: &SubmissionId) {
        let store = self.store.clone();
        let tasks = Arc::clone(&self.tasks);
        let delay = self.delay;
        let task_id = id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = store.remove_submission(&task_id).await {
                warn!("Cleanup of {} failed: {}", task_id, e);
            }
            tasks.lock().unwrap_or_else(|p| p.into_inner()).remove(&task_id);
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = tasks.insert(id.clone(), handle) {
            previous.abort();
            info!("Cleanup timer for {} reset", id);
        } else {
            info!("Cleanup for {} scheduled in {:?}", id, self.delay);
        }
    }

    /// Cancel a pending cleanup. Returns whether one was pending.
    ///
    /// Internal handle only; not exposed over HTTP.
    pub fn cancel(&self, id: &SubmissionId) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        match tasks.remove(id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of pending cleanups.
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

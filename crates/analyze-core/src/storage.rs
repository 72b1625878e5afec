//! Durable artifact storage, namespaced per submission.
//!
//! Every artifact for a submission lives under `<root>/<submission_id>/`,
//! so concurrent submissions never contend and cleanup is a single
//! recursive delete.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AnalyzeError;
use crate::submission::SubmissionId;

/// Relative artifact locations for one submission, used to build
/// download links. Transient: deleted by the cleanup scheduler.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    /// `<id>/analysis.json`
    pub json: String,
    /// `<id>/report.md`
    pub report: String,
}

/// Filesystem-backed artifact store.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn submission_dir(&self, id: &SubmissionId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Persist the original uploaded bytes under the submission namespace.
    ///
    /// Called before extraction so the original survives later failures.
    pub async fn save_file(
        &self,
        bytes: &[u8],
        name: &str,
        id: &SubmissionId,
    ) -> Result<PathBuf, AnalyzeError> {
        let dir = self.submission_dir(id).join("original");
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(sanitize_filename(name));
        tokio::fs::write(&path, bytes).await?;

        info!("Saved original upload for {} ({} bytes)", id, bytes.len());
        Ok(path)
    }

    /// Persist the raw analysis result as pretty-printed JSON.
    pub async fn save_results(
        &self,
        analysis: &Value,
        id: &SubmissionId,
    ) -> Result<PathBuf, AnalyzeError> {
        let dir = self.submission_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join("analysis.json");
        let json = serde_json::to_vec_pretty(analysis)
            .map_err(|e| AnalyzeError::Analysis(format!("unserializable result: {}", e)))?;
        tokio::fs::write(&path, json).await?;

        Ok(path)
    }

    /// Derive and persist a human-readable Markdown report.
    pub async fn generate_summary_report(
        &self,
        analysis: &Value,
        id: &SubmissionId,
    ) -> Result<PathBuf, AnalyzeError> {
        let dir = self.submission_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join("report.md");
        tokio::fs::write(&path, render_report(analysis, id)).await?;

        Ok(path)
    }

    /// Relative paths (under the storage root) for the two report artifacts.
    pub fn artifact_paths(&self, id: &SubmissionId) -> ReportArtifacts {
        ReportArtifacts {
            json: format!("{}/analysis.json", id),
            report: format!("{}/report.md", id),
        }
    }

    /// Delete every artifact under the submission namespace.
    ///
    /// Missing namespaces are not an error, so a second delete is a no-op.
    pub async fn remove_submission(&self, id: &SubmissionId) -> Result<(), AnalyzeError> {
        let dir = self.submission_dir(id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!("Removed artifacts for {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read an artifact by its storage-relative path.
    ///
    /// Rejects absolute paths and parent components, so links can never
    /// reach outside the storage root. `Ok(None)` when the file is absent.
    pub async fn read_artifact(&self, rel_path: &str) -> Result<Option<Vec<u8>>, AnalyzeError> {
        if !is_safe_relative(rel_path) {
            return Ok(None);
        }

        match tokio::fs::read(self.root.join(rel_path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Strip anything that could escape the submission directory.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .replace("..", "_");
    if base.is_empty() {
        "upload".to_string()
    } else {
        base
    }
}

fn is_safe_relative(path: &str) -> bool {
    let p = Path::new(path);
    !p.is_absolute()
        && p.components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
}

/// Render the analysis into Markdown, tolerating whatever shape the
/// analyzer returned. Known fields get sections; everything else lands
/// in a raw JSON appendix.
fn render_report(analysis: &Value, id: &SubmissionId) -> String {
    let mut out = String::new();

    let title = analysis
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Document Analysis Report");
    out.push_str(&format!("# {}\n\n", title));
    out.push_str(&format!("Submission: `{}`\n\n", id));

    if let Some(abstract_text) = analysis.get("abstract").and_then(Value::as_str) {
        if !abstract_text.is_empty() {
            out.push_str("## Abstract\n\n");
            out.push_str(abstract_text);
            out.push_str("\n\n");
        }
    }

    if let Some(sections) = analysis.get("sections").and_then(Value::as_array) {
        if !sections.is_empty() {
            out.push_str("## Sections\n\n");
            for section in sections {
                let heading = section
                    .get("title")
                    .or_else(|| section.get("heading"))
                    .and_then(Value::as_str)
                    .unwrap_or("(untitled section)");
                out.push_str(&format!("- {}\n", heading));
            }
            out.push('\n');
        }
    }

    out.push_str("## Full Result\n\n```json\n");
    out.push_str(&serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string()));
    out.push_str("\n```\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn artifacts_are_namespaced_by_submission() {
        let (_dir, store) = store();
        let a = SubmissionId::mint();
        let b = SubmissionId::mint();

        store.save_results(&json!({"n": 1}), &a).await.unwrap();
        store.save_results(&json!({"n": 2}), &b).await.unwrap();

        let a_json = store
            .read_artifact(&store.artifact_paths(&a).json)
            .await
            .unwrap()
            .unwrap();
        let b_json = store
            .read_artifact(&store.artifact_paths(&b).json)
            .await
            .unwrap()
            .unwrap();

        assert_ne!(a_json, b_json);
    }

    #[tokio::test]
    async fn report_renders_known_fields() {
        let (_dir, store) = store();
        let id = SubmissionId::mint();
        let analysis = json!({
            "title": "Paper Title",
            "abstract": "Short summary.",
            "sections": [{"title": "Introduction"}, {"heading": "Methods"}],
        });

        let path = store.generate_summary_report(&analysis, &id).await.unwrap();
        let report = std::fs::read_to_string(path).unwrap();

        assert!(report.contains("# Paper Title"));
        assert!(report.contains("Short summary."));
        assert!(report.contains("- Introduction"));
        assert!(report.contains("- Methods"));
    }

    #[tokio::test]
    async fn report_tolerates_opaque_shapes() {
        let (_dir, store) = store();
        let id = SubmissionId::mint();

        let path = store
            .generate_summary_report(&json!([1, 2, 3]), &id)
            .await
            .unwrap();
        let report = std::fs::read_to_string(path).unwrap();
        assert!(report.contains("Document Analysis Report"));
    }

    #[tokio::test]
    async fn remove_submission_is_idempotent() {
        let (_dir, store) = store();
        let id = SubmissionId::mint();
        store.save_results(&json!({}), &id).await.unwrap();

        store.remove_submission(&id).await.unwrap();
        store.remove_submission(&id).await.unwrap();

        let gone = store
            .read_artifact(&store.artifact_paths(&id).json)
            .await
            .unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn read_artifact_rejects_traversal() {
        let (_dir, store) = store();
        assert!(store.read_artifact("../etc/passwd").await.unwrap().is_none());
        assert!(store.read_artifact("/etc/passwd").await.unwrap().is_none());
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("../../evil.pdf"), "evil.pdf");
        assert_eq!(sanitize_filename("dir/paper.pdf"), "paper.pdf");
        assert_eq!(sanitize_filename(""), "upload");
    }
}

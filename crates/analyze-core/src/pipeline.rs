//! End-to-end submission orchestration.
//!
//! One request runs the sequence upload -> size check -> text acquisition
//! -> char-count check -> analysis -> persistence -> cleanup scheduling.
//! The first failure short-circuits; nothing is retried. Cleanup is
//! scheduled after persistence, so artifacts referenced by the response
//! always exist when the response is sent.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::analyzer::{DocumentSeed, StructureAnalyzer};
use crate::cleanup::CleanupScheduler;
use crate::error::AnalyzeError;
use crate::extract::TextExtractor;
use crate::limits;
use crate::storage::{ArtifactStore, ReportArtifacts};
use crate::submission::SubmissionId;

/// One uploaded file, as received from the multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Successful pipeline result.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub submission_id: SubmissionId,
    pub analysis: Value,
    pub artifacts: ReportArtifacts,
}

/// Absolute download URLs for the persisted report artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct ReportLinks {
    pub report: String,
    pub json: String,
}

impl ReportLinks {
    /// Build download URLs against the given base, pointing at the
    /// download endpoint parametrized by the artifact path.
    pub fn build(base_url: &str, artifacts: &ReportArtifacts) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            report: format!(
                "{}/download?path={}",
                base,
                urlencoding::encode(&artifacts.report)
            ),
            json: format!(
                "{}/download?path={}",
                base,
                urlencoding::encode(&artifacts.json)
            ),
        }
    }
}

/// Composes extraction, analysis, persistence, and cleanup into the
/// per-request submission pipeline.
pub struct AnalysisPipeline {
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn StructureAnalyzer>,
    store: ArtifactStore,
    cleanup: CleanupScheduler,
    max_chars: usize,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn StructureAnalyzer>,
        store: ArtifactStore,
        cleanup: CleanupScheduler,
        max_chars: usize,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            store,
            cleanup,
            max_chars,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run one submission to completion.
    ///
    /// Mints exactly one submission id. The character ceiling is enforced
    /// before the analyzer runs; the analyzer is called at most once.
    pub async fn run(
        &self,
        upload: Upload,
        precomputed_text: Option<String>,
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        let id = SubmissionId::mint();
        info!("Submission {} received: {}", id, upload.file_name);

        let text = self.acquire_text(&id, &upload, precomputed_text).await?;

        if !limits::document_within_limit(&text, self.max_chars) {
            info!("Submission {} rejected: document over char limit", id);
            return Err(AnalyzeError::DocumentTooLarge {
                max: self.max_chars,
            });
        }

        let seed = DocumentSeed::from_text(&text);
        let analysis = self.analyzer.analyze(&seed, &text).await.map_err(|e| {
            error!("Submission {} analysis failed: {}", id, e);
            e
        })?;
        info!("Submission {} analyzed", id);

        self.store.save_results(&analysis, &id).await?;
        self.store.generate_summary_report(&analysis, &id).await?;
        let artifacts = self.store.artifact_paths(&id);
        info!("Submission {} artifacts persisted", id);

        // Fire-and-forget; the response path never waits on this.
        self.cleanup.schedule(&id);

        Ok(AnalysisOutcome {
            submission_id: id,
            analysis,
            artifacts,
        })
    }

    /// Dual-path text acquisition.
    ///
    /// Client-extracted text is used verbatim and skips the extractor
    /// entirely. Otherwise the original bytes are persisted first (so the
    /// upload survives later failures) and then extracted.
    async fn acquire_text(
        &self,
        id: &SubmissionId,
        upload: &Upload,
        precomputed_text: Option<String>,
    ) -> Result<String, AnalyzeError> {
        if let Some(text) = precomputed_text.filter(|t| !t.trim().is_empty()) {
            info!("Submission {} using client-extracted text", id);
            return Ok(text);
        }

        self.store
            .save_file(&upload.bytes, &upload.file_name, id)
            .await?;
        self.extractor.extract(&upload.bytes)
    }
}

/// Assemble the success response body: the analysis result merged with
/// `submissionId` and `reportLinks`. Non-object analysis values are
/// carried under a `result` key.
pub fn response_body(outcome: &AnalysisOutcome, links: &ReportLinks) -> Value {
    let mut body = match &outcome.analysis {
        Value::Object(map) => Value::Object(map.clone()),
        other => serde_json::json!({ "result": other }),
    };

    if let Value::Object(map) = &mut body {
        map.insert(
            "submissionId".to_string(),
            Value::String(outcome.submission_id.as_str().to_string()),
        );
        map.insert(
            "reportLinks".to_string(),
            serde_json::to_value(links).unwrap_or(Value::Null),
        );
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SpyExtractor {
        calls: AtomicUsize,
    }

    impl SpyExtractor {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl TextExtractor for SpyExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<String, AnalyzeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            String::from_utf8(bytes.to_vec())
                .map_err(|_| AnalyzeError::Extraction("not utf-8".to_string()))
        }
    }

    struct StubAnalyzer {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubAnalyzer {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl StructureAnalyzer for StubAnalyzer {
        async fn analyze(&self, seed: &DocumentSeed, _text: &str) -> Result<Value, AnalyzeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AnalyzeError::Analysis("upstream unavailable".to_string()))
            } else {
                Ok(json!({ "title": seed.title, "claims": [] }))
            }
        }
    }

    fn pipeline(
        extractor: Arc<SpyExtractor>,
        analyzer: Arc<StubAnalyzer>,
        max_chars: usize,
    ) -> (tempfile::TempDir, AnalysisPipeline) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let cleanup = CleanupScheduler::new(store.clone(), Duration::from_secs(3600));
        let pipeline = AnalysisPipeline::new(extractor, analyzer, store, cleanup, max_chars);
        (dir, pipeline)
    }

    fn upload(text: &str) -> Upload {
        Upload {
            file_name: "doc.txt".to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn success_persists_both_artifacts() {
        let extractor = SpyExtractor::new();
        let analyzer = StubAnalyzer::ok();
        let (_dir, pipeline) = pipeline(extractor, analyzer, 10_000);

        let outcome = pipeline
            .run(upload("My Paper\nbody text"), None)
            .await
            .unwrap();

        let store = pipeline.store();
        assert!(store
            .read_artifact(&outcome.artifacts.json)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .read_artifact(&outcome.artifacts.report)
            .await
            .unwrap()
            .is_some());
        assert_eq!(outcome.analysis["title"], "My Paper");
    }

    #[tokio::test]
    async fn precomputed_text_skips_the_extractor() {
        let extractor = SpyExtractor::new();
        let analyzer = StubAnalyzer::ok();
        let (_dir, pipeline) = pipeline(Arc::clone(&extractor), analyzer, 10_000);

        pipeline
            .run(upload("ignored"), Some("Client text".to_string()))
            .await
            .unwrap();

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_document_never_reaches_the_analyzer() {
        let extractor = SpyExtractor::new();
        let analyzer = StubAnalyzer::ok();
        let (_dir, pipeline) = pipeline(extractor, Arc::clone(&analyzer), 5);

        let err = pipeline
            .run(upload("this text is longer than five chars"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzeError::DocumentTooLarge { max: 5 }));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn analyzer_failure_leaves_no_report_artifacts() {
        let extractor = SpyExtractor::new();
        let analyzer = StubAnalyzer::failing();
        let (dir, pipeline) = pipeline(extractor, analyzer, 10_000);

        let err = pipeline
            .run(upload("ignored"), Some("Client text".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Analysis(_)));

        // Nothing was written anywhere under the storage root.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn analyzer_is_called_exactly_once_on_success() {
        let extractor = SpyExtractor::new();
        let analyzer = StubAnalyzer::ok();
        let (_dir, pipeline) = pipeline(extractor, Arc::clone(&analyzer), 10_000);

        pipeline.run(upload("text"), None).await.unwrap();
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_submissions_get_distinct_namespaces() {
        let extractor = SpyExtractor::new();
        let analyzer = StubAnalyzer::ok();
        let (_dir, pipeline) = pipeline(extractor, analyzer, 10_000);
        let pipeline = Arc::new(pipeline);

        let (a, b) = tokio::join!(
            pipeline.run(upload("Doc A\nbody"), None),
            pipeline.run(upload("Doc B\nbody"), None),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.submission_id, b.submission_id);
        assert_eq!(a.analysis["title"], "Doc A");
        assert_eq!(b.analysis["title"], "Doc B");
    }

    #[test]
    fn report_links_embed_encoded_artifact_paths() {
        let artifacts = ReportArtifacts {
            json: "sub_1/analysis.json".to_string(),
            report: "sub_1/report.md".to_string(),
        };
        let links = ReportLinks::build("https://example.com/", &artifacts);

        assert_eq!(
            links.json,
            "https://example.com/download?path=sub_1%2Fanalysis.json"
        );
        assert_eq!(
            links.report,
            "https://example.com/download?path=sub_1%2Freport.md"
        );
    }

    #[test]
    fn response_body_merges_id_and_links() {
        let outcome = AnalysisOutcome {
            submission_id: SubmissionId::mint(),
            analysis: json!({ "title": "T", "claims": [1, 2] }),
            artifacts: ReportArtifacts {
                json: "x/analysis.json".to_string(),
                report: "x/report.md".to_string(),
            },
        };
        let links = ReportLinks::build("http://h", &outcome.artifacts);
        let body = response_body(&outcome, &links);

        assert_eq!(body["title"], "T");
        assert_eq!(body["submissionId"], outcome.submission_id.as_str());
        assert!(body["reportLinks"]["report"]
            .as_str()
            .unwrap()
            .contains("report.md"));
    }

    #[test]
    fn non_object_analysis_is_wrapped() {
        let outcome = AnalysisOutcome {
            submission_id: SubmissionId::mint(),
            analysis: json!([1, 2, 3]),
            artifacts: ReportArtifacts {
                json: "x/analysis.json".to_string(),
                report: "x/report.md".to_string(),
            },
        };
        let links = ReportLinks::build("http://h", &outcome.artifacts);
        let body = response_body(&outcome, &links);

        assert_eq!(body["result"], json!([1, 2, 3]));
        assert_eq!(body["submissionId"], outcome.submission_id.as_str());
    }
}

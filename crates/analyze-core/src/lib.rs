//! Document submission and structure-analysis pipeline.
//!
//! This crate owns the orchestration around an external AI structure
//! analyzer: size ceilings, dual-path text acquisition (client-extracted
//! or server-side PDF extraction), artifact persistence namespaced per
//! submission, deferred artifact cleanup, and the client-side submission
//! history store abstraction. The analysis itself is delegated through
//! the [`analyzer::StructureAnalyzer`] boundary.

pub mod analyzer;
pub mod cleanup;
pub mod client_store;
pub mod config;
pub mod error;
pub mod extract;
pub mod limits;
pub mod pipeline;
pub mod storage;
pub mod submission;

pub use analyzer::{DocumentSeed, HttpAnalyzer, StructureAnalyzer};
pub use cleanup::{CleanupScheduler, DEFAULT_CLEANUP_DELAY};
pub use config::AnalyzeConfig;
pub use error::AnalyzeError;
pub use extract::{PdfTextExtractor, TextExtractor};
pub use limits::MAX_PAYLOAD_BYTES;
pub use pipeline::{response_body, AnalysisOutcome, AnalysisPipeline, ReportLinks, Upload};
pub use storage::{ArtifactStore, ReportArtifacts};
pub use submission::{StoredSubmission, SubmissionId, SubmissionStatus};

//! Application state for the analyze API.

use analyze_core::{
    AnalysisPipeline, AnalyzeConfig, ArtifactStore, CleanupScheduler, HttpAnalyzer,
    PdfTextExtractor, StructureAnalyzer,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Shared application state: read-only config plus the composed pipeline.
pub struct AppState {
    pub config: AnalyzeConfig,
    pub pipeline: AnalysisPipeline,
}

impl AppState {
    /// Wire up the production pipeline from configuration.
    pub async fn new(config: AnalyzeConfig) -> Result<Self> {
        let analyzer: Arc<dyn StructureAnalyzer> = Arc::new(HttpAnalyzer::new(
            &config.analyzer_url,
            &config.analyzer_api_key,
        ));
        Self::with_analyzer(config, analyzer).await
    }

    /// Wire up the pipeline around a caller-supplied analyzer.
    ///
    /// Tests use this to substitute the external AI service.
    pub async fn with_analyzer(
        config: AnalyzeConfig,
        analyzer: Arc<dyn StructureAnalyzer>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&config.storage_root).await?;
        info!("Artifact storage at {:?}", config.storage_root);

        let store = ArtifactStore::new(&config.storage_root);
        let cleanup = CleanupScheduler::new(store.clone(), config.cleanup_delay);
        let pipeline = AnalysisPipeline::new(
            Arc::new(PdfTextExtractor),
            analyzer,
            store,
            cleanup,
            config.max_chars,
        );

        Ok(Self { config, pipeline })
    }
}

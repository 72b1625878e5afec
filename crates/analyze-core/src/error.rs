use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Request payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("No file uploaded")]
    MissingFile,

    #[error("Document is too large. Maximum {max} characters allowed.")]
    DocumentTooLarge { max: usize },

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Structure analysis failed: {0}")]
    Analysis(String),

    #[error("Failed to persist artifact: {0}")]
    Persistence(#[from] std::io::Error),
}

//! Text extraction from uploaded binaries.

use crate::error::AnalyzeError;

/// Converts an uploaded binary document into plain text.
///
/// Object-safe so the pipeline can take a spy/stub in tests.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, AnalyzeError>;
}

/// Production extractor: PDF via `pdf-extract`, UTF-8 payloads as-is.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, AnalyzeError> {
        if bytes.is_empty() {
            return Err(AnalyzeError::Extraction("file is empty".to_string()));
        }

        if bytes.starts_with(b"%PDF") {
            return pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| AnalyzeError::Extraction(e.to_string()));
        }

        // Plain-text uploads (txt, md) skip the PDF parser entirely.
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(AnalyzeError::Extraction(
                "unsupported file format".to_string(),
            )),
        }
    }
}

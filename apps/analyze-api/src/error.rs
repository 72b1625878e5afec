//! Error types for the analyze API.

use analyze_core::AnalyzeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] AnalyzeError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Pipeline(e) => match e {
                AnalyzeError::PayloadTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
                }
                AnalyzeError::MissingFile
                | AnalyzeError::DocumentTooLarge { .. }
                | AnalyzeError::Extraction(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                AnalyzeError::Analysis(_) | AnalyzeError::Persistence(_) => {
                    tracing::error!("Pipeline failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Error analyzing document: {}", e),
                    )
                }
            },
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error analyzing document: {}", e),
                )
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

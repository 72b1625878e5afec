//! HTTP handlers for the analyze API.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use analyze_core::{limits, AnalyzeError, ReportLinks, Upload};

use crate::error::ApiError;
use crate::state::AppState;

/// Analyze an uploaded document.
///
/// Multipart fields: `file` (required binary) and `fileText` (optional
/// pre-extracted text). The declared Content-Length is checked against
/// the payload ceiling before the body is consumed.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    if let Some(declared) = declared_content_length(&headers) {
        if !limits::payload_within_limit(declared, limits::MAX_PAYLOAD_BYTES) {
            info!("Rejecting {} byte payload before reading body", declared);
            return Err(AnalyzeError::PayloadTooLarge {
                limit: limits::MAX_PAYLOAD_BYTES,
            }
            .into());
        }
    }

    let mut upload: Option<Upload> = None;
    let mut file_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Failed to read file: {}", e)))?;
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("fileText") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(format!("Failed to read text: {}", e)))?;
                file_text = Some(text);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(AnalyzeError::MissingFile)?;
    info!("Analyzing upload: {}", upload.file_name);

    let outcome = state.pipeline.run(upload, file_text).await?;

    let base_url = resolve_base_url(&state, &headers);
    let links = ReportLinks::build(&base_url, &outcome.artifacts);

    Ok(Json(analyze_core::response_body(&outcome, &links)))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub path: String,
}

/// Serve a persisted artifact by its storage-relative path.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state
        .pipeline
        .store()
        .read_artifact(&params.path)
        .await
        .map_err(ApiError::Pipeline)?;

    match bytes {
        Some(bytes) => {
            let content_type = if params.path.ends_with(".json") {
                "application/json"
            } else if params.path.ends_with(".md") {
                "text/markdown; charset=utf-8"
            } else {
                "application/octet-stream"
            };
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type.to_string())],
                bytes,
            )
                .into_response())
        }
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Artifact not found: {}", params.path) })),
        )
            .into_response()),
    }
}

/// Placeholder: submission history lives client-side.
pub async fn history() -> Json<Value> {
    Json(json!({
        "message": "History is stored locally in your browser",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Placeholder: nothing to delete server-side.
pub async fn clear_history() -> Json<Value> {
    Json(json!({
        "message": "History is stored locally in your browser",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Health-check stub.
pub async fn test_endpoint() -> Json<Value> {
    Json(json!({
        "message": "API is working",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// CORS preflight response for every route.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET,POST,OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Base URL for download links: configured override first, otherwise
/// reconstructed from the forwarded-protocol and host headers.
fn resolve_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.base_url {
        return base.clone();
    }

    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", proto, host)
}

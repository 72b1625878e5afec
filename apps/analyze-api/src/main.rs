//! Analyze API server: document upload and structure analysis.
//!
//! Provides REST endpoints for:
//! - Document submission and analysis (`POST /analyze`)
//! - Report artifact download (`GET /download`)
//! - Client-side history placeholders (`/history`)

use analyze_core::AnalyzeConfig;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use analyze_api::{app, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("analyze_api=info".parse()?)
                .add_directive("analyze_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Initialize application state
    info!("Initializing analyze API...");
    let config = AnalyzeConfig::from_env();
    let state = Arc::new(AppState::new(config).await?);

    let app = app(state);

    // Parse bind address
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3002);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting analyze API on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

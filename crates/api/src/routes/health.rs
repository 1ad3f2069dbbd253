//! Unauthenticated liveness probe.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// What the probe reports.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process can answer at all.
    pub status: &'static str,
    /// Crate name, so probes can tell environments apart.
    pub service: &'static str,
    /// Running version.
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates the health probe route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

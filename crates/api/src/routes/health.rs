//! Liveness probe route.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Body returned by the liveness probe.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Fixed "ok" marker.
    pub status: &'static str,
    /// Crate version the server was built from.
    pub version: &'static str,
}

/// Reports that the process is up. Does not touch the database.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates the health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

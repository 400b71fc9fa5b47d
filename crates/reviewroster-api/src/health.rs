use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;

use crate::state::AppState;

/// Server start time (shared across all health checks)
static SERVER_START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize server start time
pub fn init_server_start_time() {
    let _ = SERVER_START_TIME.set(Instant::now());
}

fn get_uptime_seconds() -> u64 {
    SERVER_START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: DatabaseStatus,
}

/// Database connectivity status
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub connected: bool,
}

/// Health check endpoint
///
/// Always 200; `status` is "degraded" when the database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let connected = sqlx::query("SELECT 1")
        .execute(&state.db_pool)
        .await
        .is_ok();

    let response = HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: get_uptime_seconds(),
        database: DatabaseStatus { connected },
    };

    (StatusCode::OK, Json(response))
}

//! Liveness endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// GET /api/v1/health - Process and database liveness (no auth required).
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<Health>>) {
    let timer = RequestTimer::start();

    let (status, code, database) = match state.db_pool.ping().await {
        Ok(()) => ("OK", StatusCode::OK, "up"),
        Err(e) => {
            tracing::warn!(error = %e, "health check database ping failed");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    (
        code,
        Json(timer.finish(Health {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        })),
    )
}

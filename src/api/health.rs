use axum::{extract::State, Json};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{forecast::VariantKind, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
    readings: usize,
    first_reading: Option<NaiveDateTime>,
    last_reading: Option<NaiveDateTime>,
    trained: Vec<VariantKind>,
    cached_rollouts: usize,
}

/// GET /healthz
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ctx = &state.ctx;
    let series = ctx.series();
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now(),
        readings: series.len(),
        first_reading: series.first_timestamp(),
        last_reading: series.last_timestamp(),
        trained: ctx.trained_kinds(),
        cached_rollouts: ctx.cache().len(),
    })
}

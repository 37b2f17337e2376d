use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{error::ApiError, parse_start};
use crate::{
    analysis::ForecastSummary,
    data::Period,
    forecast::{ForecastPoint, VariantKind},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    pub start_date: Option<String>,
}

/// Forecast with its lowest and highest period
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub variant: VariantKind,
    pub period: Period,
    pub anchor: NaiveDateTime,
    pub forecast: Vec<ForecastPoint>,
    pub lowest: ForecastPoint,
    pub highest: ForecastPoint,
}

/// Rollouts are CPU-bound; run them off the async workers.
async fn run_forecast(
    state: AppState,
    kind: VariantKind,
    start: Option<NaiveDateTime>,
    steps: Option<usize>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let forecast =
        tokio::task::spawn_blocking(move || state.ctx.forecast(kind, start, steps)).await??;

    let summary = ForecastSummary::from_forecast(&forecast)
        .ok_or_else(|| ApiError::InternalError(format!("{} produced no points", kind)))?;

    Ok(Json(ForecastResponse {
        variant: forecast.kind,
        period: forecast.period,
        anchor: forecast.anchor,
        forecast: summary.points,
        lowest: summary.lowest,
        highest: summary.highest,
    }))
}

/// GET /predict_next_7_days - daily energy (kWh), optionally from `start_date`
pub async fn next_7_days(
    State(state): State<AppState>,
    Query(query): Query<StartQuery>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let start = query.start_date.as_deref().map(parse_start).transpose()?;
    run_forecast(state, VariantKind::DailyEnergy, start, None).await
}

/// GET /predict_next_24_hours - hourly energy (kWh)
pub async fn next_24_hours(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, ApiError> {
    run_forecast(state, VariantKind::HourlyEnergy, None, None).await
}

/// GET /efficiency_24_hours
pub async fn efficiency_24_hours(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, ApiError> {
    run_forecast(state, VariantKind::HourlyEfficiency, None, Some(24)).await
}

/// GET /efficiency_168_hours
pub async fn efficiency_168_hours(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, ApiError> {
    run_forecast(state, VariantKind::HourlyEfficiency, None, Some(168)).await
}

/// GET /efficiency_7_days - daily power factor
pub async fn efficiency_7_days(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, ApiError> {
    run_forecast(state, VariantKind::DailyEfficiency, None, None).await
}

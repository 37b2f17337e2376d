use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use serde::Deserialize;

use super::{error::ApiError, parse_start};
use crate::{
    analysis::{
        compare_weeks, daily_sub_metering, monthly_average, weekday_profile, DailySubMetering,
        MonthlyAverage, WeekComparison, WeekdayProfile,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub start: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub start_date: Option<String>,
}

fn required(value: Option<&str>, name: &str) -> Result<NaiveDateTime, ApiError> {
    let raw = value
        .ok_or_else(|| ApiError::BadRequest(format!("missing query parameter '{}'", name)))?;
    parse_start(raw)
}

/// GET /compare_weeks?start= - this week against the seven days before
pub async fn compare(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<WeekComparison>, ApiError> {
    let start = required(query.start.as_deref(), "start")?;
    Ok(Json(compare_weeks(state.ctx.series(), start)?))
}

/// GET /get_energy_performance?start_date= - daily sub-metering over a week
pub async fn energy_performance(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<DailySubMetering>>, ApiError> {
    let start = required(query.start_date.as_deref(), "start_date")?;
    Ok(Json(daily_sub_metering(state.ctx.series(), start)))
}

/// GET /get_month_average?start_date=
pub async fn month_average(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<MonthlyAverage>, ApiError> {
    let date = required(query.start_date.as_deref(), "start_date")?.date();
    Ok(Json(monthly_average(state.ctx.series(), date)?))
}

/// GET /weekday_profile
pub async fn weekday(State(state): State<AppState>) -> Result<Json<WeekdayProfile>, ApiError> {
    Ok(Json(weekday_profile(state.ctx.series())?))
}

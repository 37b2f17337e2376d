pub mod error;
pub mod forecast;
pub mod health;
pub mod usage;

use std::time::Duration;

use axum::{http::Method, routing::get, Router};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::ServerConfig, state::AppState};
use error::ApiError;

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(health::health_check))
        .route("/predict_next_7_days", get(forecast::next_7_days))
        .route("/predict_next_24_hours", get(forecast::next_24_hours))
        .route("/efficiency_24_hours", get(forecast::efficiency_24_hours))
        .route("/efficiency_168_hours", get(forecast::efficiency_168_hours))
        .route("/efficiency_7_days", get(forecast::efficiency_7_days))
        .route("/compare_weeks", get(usage::compare))
        .route("/get_energy_performance", get(usage::energy_performance))
        .route("/get_month_average", get(usage::month_average))
        .route("/weekday_profile", get(usage::weekday))
        .with_state(state);

    if server.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs))),
        )
        .layer(TraceLayer::new_for_http())
}

/// Accepts `YYYY-MM-DD` (midnight) or an ISO-8601 local date-time.
pub(crate) fn parse_start(raw: &str) -> Result<NaiveDateTime, ApiError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "'{}' is not a date (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)",
                raw
            ))
        })
}

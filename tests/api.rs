//! HTTP surface driven through the router without binding a socket.

mod common;

use std::sync::OnceLock;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{fast_training, hourly_series, ts};
use household_energy_forecast::{
    api,
    config::ServerConfig,
    data::MeterSeries,
    state::{AppState, ForecastContext},
};
use serde_json::Value;
use tower::ServiceExt;

fn server() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8000,
        enable_cors: true,
        request_timeout_secs: 30,
    }
}

/// Trained once and shared; training dominates test time.
fn app() -> Router {
    static STATE: OnceLock<AppState> = OnceLock::new();
    let state = STATE.get_or_init(|| {
        let series = hourly_series(ts(2007, 1, 1, 0), 21 * 24, |i| {
            let hour = i % 24;
            let day = i / 24 % 7;
            let active = if (18..22).contains(&hour) { 2.4 } else { 0.5 } + 0.1 * day as f64;
            (active, 0.08 + 0.01 * hour as f64)
        });
        AppState::new(ForecastContext::build(series, &fast_training(8), true).unwrap())
    });
    api::router(state.clone(), &server())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_healthz() {
    let (status, body) = get(app(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["readings"], 21 * 24);
    assert_eq!(body["trained"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_predict_next_7_days() {
    let (status, body) = get(app(), "/predict_next_7_days").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variant"], "daily_energy");
    assert_eq!(body["period"], "day");
    assert_eq!(body["forecast"].as_array().unwrap().len(), 7);
    assert_eq!(body["forecast"][0]["timestamp"], "2007-01-22T00:00:00");

    let lowest = body["lowest"]["value"].as_f64().unwrap();
    assert!(body["forecast"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["value"].as_f64().unwrap() >= lowest));
}

#[tokio::test]
async fn test_predict_from_start_date() {
    let (status, body) = get(app(), "/predict_next_7_days?start_date=2007-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["anchor"], "2007-01-15T00:00:00");
    assert_eq!(body["forecast"][0]["timestamp"], "2007-01-16T00:00:00");
}

#[tokio::test]
async fn test_start_date_after_history_is_bad_request() {
    let (status, body) = get(app(), "/predict_next_7_days?start_date=2030-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
}

#[tokio::test]
async fn test_malformed_start_date_is_bad_request() {
    let (status, _) = get(app(), "/predict_next_7_days?start_date=15/01/2007").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hourly_endpoints() {
    let (status, body) = get(app(), "/predict_next_24_hours").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"].as_array().unwrap().len(), 24);

    let (status, body) = get(app(), "/efficiency_24_hours").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"].as_array().unwrap().len(), 24);
    assert!(body["forecast"][0]["components"]["active_kw"].is_number());

    let (status, body) = get(app(), "/efficiency_168_hours").await;
    assert_eq!(status, StatusCode::OK);
    let points = body["forecast"].as_array().unwrap();
    assert_eq!(points.len(), 168);
    assert_eq!(points[167]["timestamp"], "2007-01-28T23:00:00");
}

#[tokio::test]
async fn test_efficiency_7_days_is_clipped() {
    let (status, body) = get(app(), "/efficiency_7_days").await;
    assert_eq!(status, StatusCode::OK);
    for point in body["forecast"].as_array().unwrap() {
        let pf = point["value"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&pf));
    }
}

#[tokio::test]
async fn test_compare_weeks() {
    let (status, body) = get(app(), "/compare_weeks?start=2007-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["this_week"]["efficiency"].is_number());
    assert_eq!(body["difference"].as_object().unwrap().len(), 7);

    let (status, _) = get(app(), "/compare_weeks?start=2007-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_required_parameter_is_json_bad_request() {
    for uri in ["/compare_weeks", "/get_energy_performance", "/get_month_average"] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "BadRequest");
        assert!(body["message"].as_str().unwrap().contains("missing"));
    }
}

#[tokio::test]
async fn test_energy_performance() {
    let (status, body) = get(app(), "/get_energy_performance?start_date=2007-01-08").await;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2007-01-08");
}

#[tokio::test]
async fn test_month_average() {
    let (status, body) = get(app(), "/get_month_average?start_date=2007-01-20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "report");
    assert_eq!(body["days"], 31);

    let (status, body) = get(app(), "/get_month_average?start_date=2009-06-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_data");
    assert_eq!(body["month"], "2009-06");
}

#[tokio::test]
async fn test_weekday_profile() {
    let (status, body) = get(app(), "/weekday_profile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["averages"].as_array().unwrap().len(), 7);
    // 2007-01-01 is a Monday and load grows through the week
    assert_eq!(body["lowest"], "Mon");
    assert_eq!(body["highest"], "Sun");
}

#[tokio::test]
async fn test_untrained_context_is_unavailable() {
    let ctx = ForecastContext::from_predictors(MeterSeries::default(), vec![], false);
    let app = api::router(AppState::new(ctx), &server());

    let (status, body) = get(app, "/predict_next_24_hours").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ServiceUnavailable");
}

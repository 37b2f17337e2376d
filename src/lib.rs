//! Household energy forecasting
//!
//! Loads minute-level smart-meter history, trains lag-feature random forests
//! for four forecast variants and serves autoregressive rollouts and
//! consumption reports over HTTP.

pub mod analysis;
pub mod api;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod ml;
pub mod state;
pub mod telemetry;

pub use error::{ForecastError, ForecastResult};

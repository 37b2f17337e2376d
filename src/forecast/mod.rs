//! Forecasting engine
//!
//! One descriptor-driven pipeline serves every predictor: a [`ForecastVariant`]
//! says how to resample, which features to build and how to read the
//! regressor outputs; [`Predictor`] trains once and rolls forward on demand.

pub mod cache;
pub mod features;
pub mod predictor;
pub mod rollout;
pub mod variant;

pub use cache::RolloutCache;
pub use features::{FeatureBuilder, FeatureRow, FeatureTable};
pub use predictor::{Forecast, Predictor};
pub use rollout::{rollout, Cursor, ForecastPoint, PowerComponents, Rollout};
pub use variant::{CalendarField, ClipRange, ForecastVariant, TargetRule, VariantKind};

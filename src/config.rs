use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use strum::IntoEnumIterator;
use validator::Validate;

use crate::data::LoaderOptions;
use crate::forecast::{ForecastVariant, VariantKind};
use crate::ml::TrainingConfig;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub data: DataConfig,
    #[serde(default)]
    pub training: TrainingSection,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    #[validate(range(min = 1, max = 3600))]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DataConfig {
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    #[validate(length(equal = 1))]
    pub delimiter: String,
    /// Inclusive date window applied after cleaning.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn default_delimiter() -> String {
    ";".to_string()
}

impl DataConfig {
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            delimiter: self.delimiter.bytes().next().unwrap_or(b';'),
            window: self.start_date.zip(self.end_date),
        }
    }
}

/// Per-variant ensemble settings. Absent sections keep the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingSection {
    pub daily_energy: Option<TrainingConfig>,
    pub hourly_energy: Option<TrainingConfig>,
    pub hourly_efficiency: Option<TrainingConfig>,
    pub daily_efficiency: Option<TrainingConfig>,
}

impl TrainingSection {
    pub fn override_for(&self, kind: VariantKind) -> Option<&TrainingConfig> {
        match kind {
            VariantKind::DailyEnergy => self.daily_energy.as_ref(),
            VariantKind::HourlyEnergy => self.hourly_energy.as_ref(),
            VariantKind::HourlyEfficiency => self.hourly_efficiency.as_ref(),
            VariantKind::DailyEfficiency => self.daily_efficiency.as_ref(),
        }
    }

    /// Built-in variant with any configured override applied.
    pub fn variant(&self, kind: VariantKind) -> ForecastVariant {
        let variant = ForecastVariant::for_kind(kind);
        match self.override_for(kind) {
            Some(training) => variant.with_training(training.clone()),
            None => variant,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("HEF__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("reading configuration")?;
        cfg.validate().context("validating configuration")?;
        for kind in VariantKind::iter() {
            if let Some(training) = cfg.training.override_for(kind) {
                training
                    .validate()
                    .with_context(|| format!("validating training.{}", kind))?;
            }
        }
        match (cfg.data.start_date, cfg.data.end_date) {
            (Some(start), Some(end)) => anyhow::ensure!(
                start <= end,
                "data.start_date {} is after data.end_date {}",
                start,
                end
            ),
            (None, None) => {}
            _ => anyhow::bail!("data.start_date and data.end_date must be set together"),
        }
        Ok(cfg)
    }
}

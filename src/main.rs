use anyhow::{Context, Result};
use axum::Router;
use household_energy_forecast::{
    analysis::ForecastSummary, api, config::Config, forecast::VariantKind, state::AppState,
    state::ForecastContext, telemetry,
};
use strum::IntoEnumIterator;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("reading .env");
        }
    }
    telemetry::init_tracing();

    let cfg = Config::load()?;
    info!(path = %cfg.data.path.display(), "loading meter history");

    let load_cfg = cfg.clone();
    let ctx = tokio::task::spawn_blocking(move || ForecastContext::load(&load_cfg))
        .await
        .context("startup task panicked")??;

    for kind in VariantKind::iter() {
        match ctx.forecast(kind, None, None) {
            Ok(forecast) => {
                if let Some(summary) = ForecastSummary::from_forecast(&forecast) {
                    info!(
                        variant = %kind,
                        anchor = %forecast.anchor,
                        lowest_at = %summary.lowest.timestamp,
                        lowest = summary.lowest.value,
                        highest_at = %summary.highest.timestamp,
                        highest = summary.highest.value,
                        "startup forecast"
                    );
                }
            }
            Err(e) => warn!(variant = %kind, error = %e, "startup forecast failed"),
        }
    }

    let app: Router = api::router(AppState::new(ctx), &cfg.server);
    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!("server binding to 0.0.0.0 - the API is reachable from the network");
    }

    info!(%addr, "starting household energy forecaster");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}

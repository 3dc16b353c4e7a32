// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use metering_dashboard::application::period_service::PeriodService;
use metering_dashboard::infrastructure::config::load_settings;
use metering_dashboard::infrastructure::influx_repository::InfluxRepository;
use metering_dashboard::presentation::app_state::AppState;
use metering_dashboard::presentation::handlers::{field_series, health_check, temperature_series};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        settings.influx,
        settings.metering.timezone,
        settings.queries,
    ));

    // Create services (application layer)
    let period_service = PeriodService::new(repository, settings.metering.first_measurement_date);

    let state = Arc::new(AppState { period_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/temperature/:room/*period", get(temperature_series))
        .route("/api/:field/*period", get(field_series))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.bind.parse()?;
    tracing::info!("Starting metering dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

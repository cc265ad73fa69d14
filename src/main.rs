//! Epiwatch - Global disease statistics as dashboard view models.
//!
//! # API Endpoints
//!
//! - `GET /overview` - Worldwide figures, top countries, influenza panel
//! - `GET /countries` - Every country, most cases first
//! - `GET /countries/names` - Country names for a picker
//! - `GET /countries/:name` - One country's totals and vaccinations
//! - `GET /timeseries/daily` - Worldwide history
//! - `GET /vaccinations` - Vaccination coverage, global or per country
//! - `GET /influenza` - CDC ILINet panel
//! - `GET /map` - Map circle markers
//! - `GET /severity/:table` - Severity legend
//! - `GET /diseases/:id` - Static disease profile
//! - `GET /health` - Health check

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use epiwatch::api::{AppState, router};
use epiwatch::config::Config;
use epiwatch::dashboard::{Dashboard, DashboardConfig};
use epiwatch::data_access::DataAccess;
use epiwatch::data_sources::DiseaseShClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("epiwatch=info".parse()?))
        .init();

    let config = Config::from_env();

    info!(
        port = config.port,
        api_base = %config.api_base,
        timeout_secs = config.http_timeout.as_secs(),
        top_n = config.top_n,
        "Starting Epiwatch server"
    );

    let client = DiseaseShClient::with_timeout(&config.api_base, config.http_timeout)?;
    let dashboard = Dashboard::new(
        Arc::new(DataAccess::new(client)),
        DashboardConfig {
            top_n: config.top_n,
        },
    );

    let app =
        router(AppState { dashboard }).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Epiwatch is listening");

    axum::serve(listener, app).await?;

    Ok(())
}

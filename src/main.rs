mod client;
mod config;
mod constants;
mod dashboard;
mod error;
mod geolocation;
mod globe;
mod models;
mod overlay;
mod page;
mod render;
mod sequencer;
mod service;
mod units;

use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::OpenMeteoClient;
use crate::dashboard::Dashboard;
use crate::geolocation::HostGeolocator;
use crate::globe::SceneGlobe;
use crate::service::DashboardServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "globe_weather=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting globe weather dashboard");

    let settings = config::load_settings()?;
    let api = OpenMeteoClient::new(&settings)?;
    let geolocator = HostGeolocator::from_settings(&settings, api.http());
    let dashboard = Arc::new(Dashboard::new(
        api,
        SceneGlobe::new(),
        geolocator,
        settings.units(),
    ));
    dashboard.initialize(&settings.globe_style).await;

    let server = DashboardServer::new(dashboard)
        .serve(rmcp::transport::stdio())
        .await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

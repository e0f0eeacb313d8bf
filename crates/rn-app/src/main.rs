//! Ridenav demo entry point
//!
//! Plays a scripted ride against live geocoding and routing services and
//! logs what a map renderer would be told to draw.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;

use config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            AppConfig::from_json_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e))?
        }
        None => AppConfig::default(),
    };

    info!("Starting ridenav (geocoder: {}, router: {})", config.endpoints.nominatim_url, config.endpoints.osrm_url);
    demo::run(config).await
}

// API Server Binary Entry Point
//
// Usage: cargo run --bin api_server

use fert_advisor::{create_router, AppState, NutrientTable, TableSource, WeatherService};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "fert_advisor=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let data_path =
        std::env::var("DATA_PATH").unwrap_or_else(|_| "data/soil_crop_nutrients.csv".to_string());

    let api_key = std::env::var("OWM_API_KEY").unwrap_or_default();

    let base_url = std::env::var("OWM_BASE_URL").ok();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    tracing::info!("Configuration:");
    tracing::info!("  DATA_PATH: {}", data_path);
    tracing::info!("  PORT: {}", port);

    if api_key.is_empty() {
        tracing::warn!("OWM_API_KEY is not set; location-based weather lookups will fail");
    }

    // Load the nutrient table; the built-in fallback keeps the service
    // bootable on a bad deployment
    let (table, source) = NutrientTable::load_or_builtin(&data_path);
    match source {
        TableSource::File => {
            tracing::info!("Loaded nutrient table from {} ({} rows)", data_path, table.len())
        }
        TableSource::BuiltIn => {
            tracing::warn!("Using built-in nutrient table ({} rows)", table.len())
        }
    }

    let weather = match base_url {
        Some(url) => WeatherService::with_base_url(api_key, url)?,
        None => WeatherService::new(api_key)?,
    };

    let state = AppState::new(table, weather);
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

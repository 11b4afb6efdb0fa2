//! Diagnox Backend - accepts exam images and relays them to prediction endpoints.

use std::env;
use std::sync::Arc;

use diagnox_backend::{build_router, logging, AppState, Config, DiagnosisCoordinator};
use tokio::net::TcpListener;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("diagnox-backend {}", VERSION);
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check config.toml or the DIAGNOX__* environment variables.",
            e
        )
    })?;

    logging::init(&config.logging.level);
    tracing::info!("Starting {} {}", config.service_name, VERSION);

    let coordinator = DiagnosisCoordinator::from_config(&config)?;
    tracing::info!(
        "Loaded {} prediction endpoint(s), default route {:?}",
        coordinator.registry().len(),
        config.routing.default
    );

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let state = Arc::new(AppState::new(config, coordinator));
    let app = build_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// File: services/slotbook_backend/src/main.rs
use slotbook_backend::{build_router, AppState};
use slotbook_common::logging;
use slotbook_config::load_config;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_level(logging::parse_level(&config.log_level));

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            logging::log_error(e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };
    let app = build_router(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);
    #[cfg(feature = "openapi")]
    info!("Swagger UI at http://{}/api/docs", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

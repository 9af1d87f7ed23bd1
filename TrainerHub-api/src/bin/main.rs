use std::path::Path;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use trainer_hub_api::api::create_application;
use trainer_hub_api::config::AppConfig;
use trainer_hub_data::database::DatabaseType;
use trainer_hub_domain::auth::token_blacklist;

/// The main entry point for the TrainerHub API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Loads and validates the configuration
/// 4. Ensures the data directory exists
/// 5. Creates and starts the Axum web application
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting TrainerHub API server");

    let config = AppConfig::from_env().context("invalid configuration")?;

    if config.database.db_type == DatabaseType::Sqlite {
        if let Some(data_dir) = Path::new(&config.database.sqlite_path).parent() {
            if !data_dir.as_os_str().is_empty() && !data_dir.exists() {
                info!("Creating data directory: {}", data_dir.display());
                std::fs::create_dir_all(data_dir)
                    .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
            }
        }
        info!("Using SQLite database at {}", config.database.sqlite_path);
    }

    // Revoked tokens are pruned once they would have expired anyway
    let _cleanup = token_blacklist::start_cleanup_task();

    let app = create_application(&config).context("failed to build the application")?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);
    info!("Function endpoints mounted at {}", config.functions_prefix);

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Sets up a signal handler for graceful shutdown
///
/// Returns when either CTRL+C or SIGTERM (on Unix systems) is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}

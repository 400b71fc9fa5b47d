mod config;

use config::AppConfig;
use reviewroster_api::{AppState, init_server_start_time, router};
use reviewroster_core::{CandidatePicker, OperationScope, ReviewService};
use reviewroster_db::{SqlStore, create_pool, run_migrations};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize server start time for health endpoint
    init_server_start_time();

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");

    // Create database connection pool
    let db_pool = match create_pool(&config.database.url, config.database.max_connections).await {
        Ok(pool) => {
            info!("Database connection pool created: {}", config.database.url);
            pool
        }
        Err(e) => {
            error!("Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Run database migrations
    if let Err(e) = run_migrations(&db_pool).await {
        error!("Failed to run database migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations completed successfully");

    let picker = match config.assignment.rng_seed {
        Some(seed) => {
            info!("Reviewer selection seeded with {}", seed);
            CandidatePicker::seeded(seed)
        }
        None => CandidatePicker::from_entropy(),
    };

    let store = Arc::new(SqlStore::new(db_pool.clone()));
    let service = ReviewService::new(store, Arc::new(picker));

    // Cancelled on shutdown so in-flight service calls stop waiting
    let shutdown = CancellationToken::new();
    let scope = OperationScope::new(shutdown.clone(), config.server.request_timeout());

    let app = router(AppState::new(db_pool, service, scope));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    if let Err(e) = serve.await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

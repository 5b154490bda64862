//! finlink service binary.
//!
//! Wires the pieces together: configuration, logging, database pool and
//! migrations, the provider client, the sync worker pool and the HTTP
//! router, then serves until shutdown and drains in-flight sync jobs.

mod config;
mod logging;
mod openapi;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Json;
use config::Config;
use finlink_api::ApiState;
use finlink_provider::{ProviderConfig, RestProviderClient};
use finlink_sync::{SyncQueue, SyncWorker};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting finlink"
    );

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = finlink_db::run_migrations(&pool).await {
        eprintln!("Failed to run migrations: {e}");
        std::process::exit(1);
    }
    info!("Migrations applied");

    let provider = match RestProviderClient::new(ProviderConfig::new(
        config.provider_base_url.clone(),
        config.provider_client_id.clone(),
        config.provider_secret.clone(),
    )) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to build provider client: {e}");
            std::process::exit(1);
        }
    };

    let (queue, jobs) = SyncQueue::new();
    let worker = Arc::new(SyncWorker::new(
        pool.clone(),
        provider.clone(),
        config.webhook_url.clone(),
        config.retry.clone(),
        config.worker.clone(),
    ));
    let worker_handle = tokio::spawn(worker.run(jobs));

    let state = ApiState {
        pool,
        provider,
        queue,
        site_url: config.site_url.clone(),
    };

    let app = finlink_api::router(state)
        .route("/health", get(health))
        .merge(openapi::swagger_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = match tokio::net::TcpListener::bind(config.bind_addr()).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind {}: {e}", config.bind_addr());
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind_addr(), "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
    }

    // The router (and with it the queue sender) is gone once serve returns;
    // the worker drains what is in flight and stops.
    info!("Server stopped, draining sync worker");
    if let Err(e) = worker_handle.await {
        eprintln!("Worker task panicked: {e}");
    }
    info!("Shutdown complete");
}

/// Liveness endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

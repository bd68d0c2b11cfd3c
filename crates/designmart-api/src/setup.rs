//! Application setup: database pool, migrations, vault, routes, server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use designmart_core::Config;
use designmart_db::{DesignStore, PgDesignStore};
use designmart_storage::DesignVault;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api_doc;
use crate::auth::auth_context_middleware;
use crate::handlers;
use crate::state::AppState;

/// Initialize the entire application: validate config, connect the
/// database, run migrations, prepare the asset vault, and build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    config.validate().context("Configuration validation failed")?;

    let pool = setup_database(&config).await?;
    let vault = DesignVault::new(&config.asset_root)
        .await
        .context("Failed to initialize asset vault")?;

    let store: Arc<dyn DesignStore> = Arc::new(PgDesignStore::new(pool));
    let state = Arc::new(AppState::new(config, store, vault));
    let router = build_router(state.clone());

    Ok((state, router))
}

/// Connect the pool and run embedded migrations.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    designmart_db::migrator()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected and migrations applied"
    );

    Ok(pool)
}

/// Build the full router. Separated from [`initialize_app`] so tests can
/// mount the routes over an in-memory store and a temp-dir vault.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = setup_cors(&state.config);
    let body_limit = state.config.max_request_body_size;

    Router::new()
        .route("/api/v0/designs", post(handlers::design_upload::upload_design))
        .route("/api/v0/designs/mine", get(handlers::my_designs::list_my_designs))
        .route(
            "/api/v0/designs/pending",
            get(handlers::review::list_pending),
        )
        .route(
            "/api/v0/designs/{id}/decision",
            post(handlers::review::decide_design),
        )
        .route(
            "/api/v0/designs/{id}",
            delete(handlers::design_delete::delete_design),
        )
        .route("/uploads/{*path}", get(handlers::file_delivery::serve_asset))
        .route(
            "/api/openapi.json",
            get(|| async { Json(api_doc::openapi_spec()) }),
        )
        .layer(axum::middleware::from_fn(auth_context_middleware))
        // Axum's built-in 2 MiB cap would otherwise override the configured
        // limit before Multipart ever sees the body.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn setup_cors(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the server with graceful shutdown on SIGINT/SIGTERM.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        asset_root = %config.asset_root,
        preview_max_mb = config.preview_max_file_size / 1024 / 1024,
        raw_max_mb = config.raw_max_file_size / 1024 / 1024,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// # Panics
/// Panics if the signal handlers cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

//! REST backend for a restaurant's menu items and categories, stored in
//! MongoDB.
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | `/category`, `/menu` | create |
//! | GET | `/category/{id}`, `/menu/{id}` | read one |
//! | PUT | `/category/{id}`, `/menu/{id}` | update |
//! | DELETE | `/category/{id}`, `/menu/{id}` | delete |
//! | GET | `/categorys`, `/menus` | read all |
//!
//! Every response, success or failure, is wrapped as
//! `{"status": <code>, "message": "success"|"error", "data": {"data": <payload>}}`.
use std::sync::Arc;

use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use crate::config::Config;
use crate::state::AppState;
use crate::store::MongoStore;

/// Build the router with CORS and request tracing applied to every route.
pub fn app(state: AppState, config: &Config) -> Router {
    Router::new()
        .merge(routes::api_router())
        .method_not_allowed_fallback(routes::common::method_not_allowed)
        .fallback(routes::common::not_found)
        .layer(config.cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    fmt().with_env_filter(filter).init();

    info!("Connecting to store...");
    let store = Arc::new(
        MongoStore::connect(&config.mongo_uri, &config.database, config.store_timeout()).await?,
    );

    let app = app(AppState::new(store.clone()), &config);

    let address = config.socket_addr()?;
    let listener = TcpListener::bind(address).await?;
    info!(
        "Server running on {address} (store timeout {}s)",
        config.store_timeout_secs
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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
}

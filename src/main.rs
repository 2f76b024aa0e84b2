//! Device allocation webhook.
//!
//! Invoked by a device-provisioning service during enrollment: validates the
//! allocation request, looks up or creates the device's digital-twin record,
//! picks one of the enrollment's linked hubs, and returns the hub name plus
//! the initial twin state (tags/properties) to apply to the device.
//!
//! # Configuration
//! All settings are plain environment variables, read once at startup.
//!
//! | Env var            | Default                  |
//! |--------------------|--------------------------|
//! | `ALLOCATOR_ADDR`   | `0.0.0.0:8080`           |
//! | `TWIN_STORE_URL`   | `http://localhost:8800`  |
//! | `TWIN_STORE_TOKEN` | (unset — no auth header) |

mod config;
mod error;
mod handlers;
mod models;
mod resolver;
mod selector;
mod twin_store;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use config::Config;
use selector::{FirstHubSelector, HubSelector};
use twin_store::{HttpTwinStore, TwinStore};

// ------------------------------------------------------------------ //
//  Shared application state                                           //
// ------------------------------------------------------------------ //

/// Shared state injected into every Axum handler via `State`.
pub struct AppState {
    /// Client for the external digital-twin store.
    pub twin_store: Arc<dyn TwinStore>,
    /// Hub-selection policy.
    pub selector: Arc<dyn HubSelector>,
}

// ------------------------------------------------------------------ //
//  Entry point                                                        //
// ------------------------------------------------------------------ //

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("allocation_webhook=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env();
    info!(twin_store_url = %cfg.twin_store_url, "using twin store");

    let state = Arc::new(AppState {
        twin_store: Arc::new(HttpTwinStore::new(
            cfg.twin_store_url.clone(),
            cfg.twin_store_token.clone(),
        )),
        selector: Arc::new(FirstHubSelector),
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = cfg.bind_addr, "allocation webhook listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router. Separate from `main` so tests can drive it with an
/// injected fake store.
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // The provisioning trigger may use GET or POST; both carry JSON.
        .route("/allocate", get(handlers::allocate).post(handlers::allocate))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

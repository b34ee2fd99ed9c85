use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use nimbus_dryrun::HttpTransport;
use nimbus_reconciler::config::{load_config, ENV_CONFIG};
use nimbus_reconciler::{FeatureFlags, FileObjectStore, ReconcilerConfig};

mod error;
mod middleware;
mod routes;
mod state;

use state::AppState;

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/dry-run", post(routes::dry_run::plan))
        .route(
            "/projects/{name}/reconcile",
            post(routes::reconcile::reconcile_project),
        )
        .layer(axum_mw::from_fn(middleware::request_log::request_log))
        .layer(cors)
        .with_state(state)
}

fn read_config() -> eyre::Result<ReconcilerConfig> {
    let path = env::var(ENV_CONFIG)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("nimbus.json"));

    let config = if path.exists() {
        load_config(&path)?
    } else {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        ReconcilerConfig::default()
    };

    let config = config
        .with_env_overrides(|key| env::var(key).ok())
        .with_features(FeatureFlags::from_env());
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = read_config()?;
    let transport = HttpTransport::new(config.request_timeout())?;
    let store = FileObjectStore::new(config.store_dir.clone());
    let listen_addr = config.listen_addr.clone();

    tracing::info!(
        base_url = %config.base_url,
        store_dir = %config.store_dir.display(),
        features = config.features.len(),
        "starting"
    );

    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        transport: Arc::new(transport),
    };

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

//! Clash tracker service entrypoint wiring configuration, storage and the HTTP status routes.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clash_tracker::{
    config::AppConfig,
    dao::{
        codingame::CodinGameClient,
        storage::StorageError,
        tracker_store::{TrackerStore, memory::MemoryTrackerStore},
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let fetcher = CodinGameClient::new(config.codingame.clone()).context("building CodinGame client")?;
    let app_state = AppState::new(Arc::new(fetcher), Arc::new(config.lang));

    start_storage(&app_state).await?;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the storage backend selected by `STORAGE_BACKEND`.
///
/// Database backends are connected by the supervisor in the background; the
/// service stays in degraded mode until the first connection succeeds.
async fn start_storage(state: &SharedState) -> anyhow::Result<()> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| default_backend().into());
    info!(%backend, "selecting storage backend");

    match backend.as_str() {
        "memory" => {
            state
                .set_tracker_store(Arc::new(MemoryTrackerStore::new()))
                .await;
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            tokio::spawn(storage_supervisor::run(state.clone(), connect_mongo));
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            tokio::spawn(storage_supervisor::run(state.clone(), connect_couch));
        }
        other => anyhow::bail!("unsupported storage backend `{other}`"),
    }

    Ok(())
}

fn default_backend() -> &'static str {
    if cfg!(feature = "mongo-store") {
        "mongo"
    } else {
        "memory"
    }
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> Result<Arc<dyn TrackerStore>, StorageError> {
    use clash_tracker::dao::tracker_store::mongodb::{MongoConfig, MongoTrackerStore};

    let config = MongoConfig::from_env().await?;
    let store: Arc<dyn TrackerStore> = Arc::new(MongoTrackerStore::connect(config).await?);
    Ok(store)
}

#[cfg(feature = "couch-store")]
async fn connect_couch() -> Result<Arc<dyn TrackerStore>, StorageError> {
    use clash_tracker::dao::tracker_store::couchdb::{CouchConfig, CouchTrackerStore};

    let config = CouchConfig::from_env()?;
    let store: Arc<dyn TrackerStore> = Arc::new(CouchTrackerStore::connect(config).await?);
    Ok(store)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

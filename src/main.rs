//! Presence Hub server entry point.

use std::sync::Arc;

use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use presence_hub::adapters::{
    websocket_router, ConnectionHub, InMemoryStore, PostgresStore, WebSocketState,
};
use presence_hub::application::ChatServices;
use presence_hub::config::{AppConfig, LogFormat, Persistence, ServerConfig};
use presence_hub::ports::{GroupReader, MessageRepository, UserPresenceStore};

type Stores = (
    Arc<dyn UserPresenceStore>,
    Arc<dyn GroupReader>,
    Arc<dyn MessageRepository>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let (users, groups, messages) = open_stores(&config).await?;
    let hub = Arc::new(ConnectionHub::new(config.hub.outbound_buffer));
    let services = Arc::new(ChatServices::new(
        users,
        groups,
        messages,
        hub.clone(),
        config.hub.mirror_presence,
    ));

    let app = websocket_router()
        .with_state(WebSocketState::new(services, hub))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        persistence = config.database.persistence().label(),
        "Presence hub listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Presence hub stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match server.effective_log_format() {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_stores(config: &AppConfig) -> Result<Stores, Box<dyn std::error::Error>> {
    match config.database.persistence() {
        Persistence::Postgres(_) => {
            let store = Arc::new(PostgresStore::connect(&config.database).await?);
            Ok((store.clone(), store.clone(), store))
        }
        Persistence::InMemory => {
            tracing::warn!("No database URL configured; using in-memory store");
            let store = Arc::new(InMemoryStore::new());
            Ok((store.clone(), store.clone(), store))
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .origins()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

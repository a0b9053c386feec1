//! CampusFlow Gate Server
//!
//! Main entry point for the gate-management dashboard backend.

use campusflow::{
    ai_client::AiClient,
    camera_feed::CameraFeedController,
    gate_store::{GateStore, UserRole},
    realtime_hub::RealtimeHub,
    state::{AppConfig, AppState},
    traffic_simulator::TrafficSimulator,
    web_api,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campusflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CampusFlow gate server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        host = %config.host,
        port = config.port,
        ai_url = %config.ai_url,
        fetch_strategy = ?config.camera_fetch_strategy,
        "Configuration loaded"
    );

    // Initialize components
    let hub = Arc::new(RealtimeHub::new());
    let store = Arc::new(GateStore::new(hub.clone()));
    tracing::info!("GateStore initialized from seed data");

    let ai_client = Arc::new(AiClient::new(config.ai_url.clone()));
    let camera = Arc::new(CameraFeedController::new(
        store.clone(),
        ai_client.clone(),
        hub.clone(),
        config.camera_fetch_strategy,
        config.proxy_base_url.clone(),
        Duration::from_secs(config.camera_timeout_secs),
    ));
    tracing::info!("CameraFeedController initialized");

    let simulator = Arc::new(TrafficSimulator::new(store.clone()));

    // The default session is the reception view; the simulator follows
    // role transitions from here on
    if store.session().await.role == UserRole::Reception {
        simulator.start().await;
    }

    let state = AppState {
        config: config.clone(),
        store,
        hub,
        ai_client,
        camera,
        simulator,
    };

    // Build router with middleware
    let app = web_api::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(addr = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

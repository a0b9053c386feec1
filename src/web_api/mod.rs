//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Request validation
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let ai_ok = state.ai_client.health_check().await.unwrap_or(false);

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_connected: ai_ok,
        camera_connected: state.camera.is_connected().await,
        ws_clients: state.hub.connection_count(),
    };

    Json(response)
}

/// Service status endpoint
pub async fn service_status(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.store.session().await;
    Json(json!({
        "service": "campusflow-gate",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "role": session.role
    }))
}

//! Application state
//!
//! Holds all shared components and state

use crate::ai_client::AiClient;
use crate::camera_feed::{CameraFeedController, FetchStrategy};
use crate::gate_store::GateStore;
use crate::realtime_hub::RealtimeHub;
use crate::traffic_simulator::TrafficSimulator;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// AI collaborator base URL (plate identification / traffic prediction)
    pub ai_url: String,
    /// How the live-feed controller fetches the stream (direct | proxied)
    pub camera_fetch_strategy: FetchStrategy,
    /// Base URL of this server, used when the fetch strategy is proxied
    pub proxy_base_url: String,
    /// Upstream fetch timeout for camera frames, in seconds
    pub camera_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            ai_url: std::env::var("AI_URL")
                .unwrap_or_else(|_| "http://localhost:9400".to_string()),
            camera_fetch_strategy: FetchStrategy::from_config(
                &std::env::var("CAMERA_FETCH_STRATEGY").unwrap_or_default(),
            ),
            proxy_base_url: std::env::var("PROXY_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            camera_timeout_secs: std::env::var("CAMERA_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(10),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// GateStore (SSoT for dashboard state)
    pub store: Arc<GateStore>,
    /// RealtimeHub (WebSocket distribution)
    pub hub: Arc<RealtimeHub>,
    /// AiClient (plate identification / traffic prediction)
    pub ai_client: Arc<AiClient>,
    /// CameraFeedController (live feed + scanning)
    pub camera: Arc<CameraFeedController>,
    /// TrafficSimulator (reception-only synthetic activity)
    pub simulator: Arc<TrafficSimulator>,
}

//! CampusFlow Gate Server Library
//!
//! School campus gate management: vehicle access, pickup requests and
//! AI-assisted plate scanning.
//!
//! ## Architecture (6 Components)
//!
//! 1. GateStore - SSoT for vehicles, requests, notifications, attendance
//! 2. CameraFeedController - Stream connection + frame capture + scanning
//! 3. AiClient - Plate identification / traffic prediction adapter
//! 4. TrafficSimulator - Synthetic gate activity for the reception view
//! 5. RealtimeHub - WebSocket distribution
//! 6. WebAPI - REST API endpoints
//!
//! ## Design Principles
//!
//! - SSoT: GateStore is the single source of truth; views never mutate
//!   collections directly
//! - Failed preconditions are silent no-ops, collaborator failures are
//!   caught at the boundary and surfaced as transient messages

pub mod ai_client;
pub mod camera_feed;
pub mod error;
pub mod gate_store;
pub mod models;
pub mod realtime_hub;
pub mod state;
pub mod traffic_simulator;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;

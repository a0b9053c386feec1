//! API Routes

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::gate_store::{RegisterVehicleData, SubmitRequestData, UserRole, VehicleId};
use crate::models::ApiResponse;
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/healthz", get(super::health_check))
        .route("/api/status", get(super::service_status))
        // Vehicles
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles", post(register_vehicle))
        // Pickup requests
        .route("/api/requests", get(list_requests))
        .route("/api/requests", post(submit_request))
        .route("/api/requests/:id/approve", post(approve_request))
        .route("/api/requests/:id/deny", post(deny_request))
        // Activity & attendance
        .route("/api/notifications", get(list_notifications))
        .route("/api/attendance", get(list_attendance))
        .route("/api/schedules", get(list_schedules))
        // Gate
        .route("/api/gate", get(gate_view))
        .route("/api/gate/enter", post(enter_gate))
        .route("/api/gate/exit", post(exit_gate))
        // Session
        .route("/api/session", get(get_session))
        .route("/api/session/role", post(change_role))
        .route("/api/session/tab", put(set_active_tab))
        // AI collaborators
        .route("/identify-plate", post(identify_plate))
        .route("/api/predict-traffic", post(predict_traffic))
        // Camera
        .route("/camera-proxy", get(camera_proxy))
        .route("/api/camera/connect", post(camera_connect))
        .route("/api/camera/disconnect", post(camera_disconnect))
        .route("/api/camera/scan", post(camera_scan))
        .route("/api/camera/autoscan", put(camera_autoscan))
        .route("/api/camera/status", get(camera_status))
        // WebSocket
        .route("/api/ws", get(websocket_handler))
        .with_state(state)
}

// ========================================
// Vehicle Handlers
// ========================================

async fn list_vehicles(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.vehicles().await))
}

async fn register_vehicle(
    State(state): State<AppState>,
    Json(req): Json<RegisterVehicleData>,
) -> impl IntoResponse {
    match state.store.register_vehicle(req).await {
        Ok(vehicle) => (StatusCode::CREATED, Json(ApiResponse::success(vehicle))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Pickup Request Handlers
// ========================================

async fn list_requests(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.requests().await))
}

async fn submit_request(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequestData>,
) -> impl IntoResponse {
    let request = state.store.submit_request(req).await;
    (StatusCode::CREATED, Json(ApiResponse::success(request)))
}

async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.store.approve_request(id).await {
        Some(request) => Json(ApiResponse::success(request)).into_response(),
        // Already-resolved requests are a no-op; echo the unchanged request
        None => match state.store.request(id).await {
            Some(request) => Json(ApiResponse::success(request)).into_response(),
            None => Error::NotFound(format!("Request {id} not found")).into_response(),
        },
    }
}

/// Denial body
#[derive(Debug, Deserialize)]
struct DenyRequestBody {
    reason: Option<String>,
}

async fn deny_request(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<DenyRequestBody>,
) -> impl IntoResponse {
    match state.store.deny_request(id, body.reason).await {
        Some(request) => Json(ApiResponse::success(request)).into_response(),
        None => match state.store.request(id).await {
            Some(request) => Json(ApiResponse::success(request)).into_response(),
            None => Error::NotFound(format!("Request {id} not found")).into_response(),
        },
    }
}

// ========================================
// Activity Handlers
// ========================================

async fn list_notifications(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.notifications().await))
}

async fn list_attendance(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.attendance().await))
}

async fn list_schedules(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.schedules().await))
}

// ========================================
// Gate Handlers
// ========================================

async fn gate_view(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.gate_view().await))
}

/// Gate action body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GateActionRequest {
    vehicle_id: VehicleId,
}

async fn enter_gate(
    State(state): State<AppState>,
    Json(req): Json<GateActionRequest>,
) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.store.enter_gate(req.vehicle_id).await,
    ))
}

async fn exit_gate(
    State(state): State<AppState>,
    Json(req): Json<GateActionRequest>,
) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.store.exit_gate(req.vehicle_id).await,
    ))
}

// ========================================
// Session Handlers
// ========================================

async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.session().await))
}

/// Role change body
#[derive(Debug, Deserialize)]
struct ChangeRoleRequest {
    role: UserRole,
}

async fn change_role(
    State(state): State<AppState>,
    Json(req): Json<ChangeRoleRequest>,
) -> impl IntoResponse {
    let session = state.store.change_role(req.role).await;

    // The simulation only runs for the reception view
    if req.role == UserRole::Reception {
        state.simulator.start().await;
    } else {
        state.simulator.stop().await;
    }

    Json(ApiResponse::success(session))
}

/// Tab change body
#[derive(Debug, Deserialize)]
struct SetTabRequest {
    tab: String,
}

async fn set_active_tab(
    State(state): State<AppState>,
    Json(req): Json<SetTabRequest>,
) -> impl IntoResponse {
    state.store.set_active_tab(req.tab.clone()).await;
    Json(json!({"ok": true, "activeTab": req.tab}))
}

// ========================================
// AI Collaborator Handlers
// ========================================

/// Identify-plate body; the URI is optional so a missing field maps to a
/// 400 with the documented error message rather than a deserialize failure
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyPlateBody {
    photo_data_uri: Option<String>,
}

async fn identify_plate(
    State(state): State<AppState>,
    Json(body): Json<IdentifyPlateBody>,
) -> Response {
    let Some(photo_data_uri) = body.photo_data_uri else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Photo data URI is required"})),
        )
            .into_response();
    };

    if !photo_data_uri.starts_with("data:image/") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid data URI format. Must be a base64 encoded image."
            })),
        )
            .into_response();
    }

    match state.ai_client.identify_plate(&photo_data_uri).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "License plate identification error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to identify license plate",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Traffic prediction body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictTrafficBody {
    historical_data: String,
    current_conditions: String,
}

async fn predict_traffic(
    State(state): State<AppState>,
    Json(body): Json<PredictTrafficBody>,
) -> impl IntoResponse {
    match state
        .ai_client
        .predict_traffic(&body.historical_data, &body.current_conditions)
        .await
    {
        Ok(prediction) => Json(ApiResponse::success(prediction)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Camera Handlers
// ========================================

/// Camera proxy query params
#[derive(Debug, Deserialize)]
struct CameraProxyParams {
    url: Option<String>,
}

/// Relay an upstream camera image, bypassing browser cross-origin limits.
/// Responses are never cached; upstream failures come back as a classified
/// 503 for diagnostic display.
async fn camera_proxy(
    State(state): State<AppState>,
    Query(params): Query<CameraProxyParams>,
) -> Response {
    let Some(url) = params.url else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Camera URL is required"})),
        )
            .into_response();
    };

    match state.camera.fetch_raw(&url).await {
        Ok((bytes, content_type)) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_str(&content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("image/jpeg")),
            );
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            );
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
            headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
            (StatusCode::OK, headers, bytes).into_response()
        }
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": err.kind.message(),
                "details": err.details,
                "code": err.kind.code(),
                "url": url,
            })),
        )
            .into_response(),
    }
}

/// Connect body
#[derive(Debug, Deserialize)]
struct CameraConnectRequest {
    url: String,
}

async fn camera_connect(
    State(state): State<AppState>,
    Json(req): Json<CameraConnectRequest>,
) -> impl IntoResponse {
    match state.camera.connect(req.url).await {
        Ok(status) => Json(ApiResponse::success(status)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn camera_disconnect(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.camera.disconnect().await))
}

async fn camera_scan(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.camera.scan().await))
}

/// Autoscan toggle body
#[derive(Debug, Deserialize)]
struct AutoscanRequest {
    enabled: bool,
}

async fn camera_autoscan(
    State(state): State<AppState>,
    Json(req): Json<AutoscanRequest>,
) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.camera.set_autoscan(req.enabled).await,
    ))
}

async fn camera_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.camera.status().await))
}

// ========================================
// WebSocket
// ========================================

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (conn_id, mut rx) = state.hub.register().await;

    tracing::info!(connection_id = %conn_id, "WebSocket client connected");

    // Forward hub messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Drain incoming messages until the client goes away
    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %conn_id, "WebSocket client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
        conn_id
    });

    let conn_id = tokio::select! {
        _ = send_task => conn_id,
        result = recv_task => result.unwrap_or(conn_id),
    };

    state.hub.unregister(&conn_id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_client::AiClient;
    use crate::camera_feed::{CameraFeedController, FetchStrategy};
    use crate::gate_store::GateStore;
    use crate::realtime_hub::RealtimeHub;
    use crate::state::AppConfig;
    use crate::traffic_simulator::TrafficSimulator;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_state() -> AppState {
        let hub = Arc::new(RealtimeHub::new());
        let store = Arc::new(GateStore::new(hub.clone()));
        let ai_client = Arc::new(AiClient::new("http://localhost:9400".to_string()));
        let camera = Arc::new(CameraFeedController::new(
            store.clone(),
            ai_client.clone(),
            hub.clone(),
            FetchStrategy::Direct,
            "http://localhost:8080".to_string(),
            Duration::from_secs(2),
        ));
        let simulator = Arc::new(TrafficSimulator::new(store.clone()));
        AppState {
            config: AppConfig::default(),
            store,
            hub,
            ai_client,
            camera,
            simulator,
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_camera_proxy_requires_url() {
        let response =
            camera_proxy(State(test_state()), Query(CameraProxyParams { url: None })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Camera URL is required"));
    }

    #[tokio::test]
    async fn test_identify_plate_requires_photo() {
        let response = identify_plate(
            State(test_state()),
            Json(IdentifyPlateBody {
                photo_data_uri: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Photo data URI is required"));
    }

    #[tokio::test]
    async fn test_identify_plate_rejects_non_image_uri() {
        let response = identify_plate(
            State(test_state()),
            Json(IdentifyPlateBody {
                photo_data_uri: Some("data:text/plain;base64,AAAA".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.contains("Invalid data URI format"));
    }
}

//! CameraFeedController - Gate Camera Live Feed
//!
//! ## Responsibilities
//!
//! - Connect to an operator-supplied image-stream URL (direct or proxied)
//! - Capture frames on demand and submit them for plate identification
//! - Apply identification results to the gate store (entry/exit)
//! - Periodic autoscan with an in-flight guard
//!
//! Every failure here is recoverable by operator action (retry connect,
//! re-enable autoscan); none are fatal to the session.

mod types;

pub use types::{
    classify_fetch_error, CameraFeedStatus, FetchStrategy, ScanOutcome, StreamError,
    StreamErrorKind,
};

use crate::ai_client::AiClient;
use crate::error::{Error, Result};
use crate::gate_store::{GateStore, VehicleStatus};
use crate::realtime_hub::{HubMessage, RealtimeHub};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;

/// Period between automatic scans
pub const AUTOSCAN_PERIOD: Duration = Duration::from_secs(5);

struct FeedState {
    url: Option<String>,
    effective_url: Option<String>,
    active: bool,
    autoscan: bool,
    last_error: Option<StreamError>,
    last_outcome: Option<ScanOutcome>,
    /// Bumped on every connect/disconnect; in-flight work whose generation
    /// no longer matches is discarded instead of mutating state.
    generation: u64,
}

/// CameraFeedController instance.
///
/// Cheap to clone; clones share the same stream state, so the autoscan
/// loop and request handlers observe one controller.
#[derive(Clone)]
pub struct CameraFeedController {
    client: reqwest::Client,
    strategy: FetchStrategy,
    proxy_base_url: String,
    store: Arc<GateStore>,
    ai_client: Arc<AiClient>,
    hub: Arc<RealtimeHub>,
    state: Arc<RwLock<FeedState>>,
    scanning: Arc<AtomicBool>,
    loop_running: Arc<RwLock<bool>>,
}

impl CameraFeedController {
    /// Create new controller
    pub fn new(
        store: Arc<GateStore>,
        ai_client: Arc<AiClient>,
        hub: Arc<RealtimeHub>,
        strategy: FetchStrategy,
        proxy_base_url: String,
        fetch_timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent("CampusFlow/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            strategy,
            proxy_base_url,
            store,
            ai_client,
            hub,
            state: Arc::new(RwLock::new(FeedState {
                url: None,
                effective_url: None,
                active: false,
                autoscan: false,
                last_error: None,
                last_outcome: None,
                generation: 0,
            })),
            scanning: Arc::new(AtomicBool::new(false)),
            loop_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Connect to a stream URL and attempt the first frame.
    ///
    /// Only a missing URL is an error; a failed load attempt is recorded as
    /// a classified [`StreamError`] in the returned status.
    pub async fn connect(&self, url: String) -> Result<CameraFeedStatus> {
        let url = url.trim().to_string();
        if url.is_empty() {
            return Err(Error::Validation("Camera URL is required".to_string()));
        }

        let effective = build_effective_url(self.strategy, &self.proxy_base_url, &url);
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.url = Some(url.clone());
            state.effective_url = Some(effective.clone());
            state.active = false;
            state.last_error = None;
            state.last_outcome = None;
            state.generation
        };

        tracing::info!(url = %url, strategy = ?self.strategy, "Connecting to camera stream");

        match self.fetch_raw(&effective).await {
            Ok((bytes, _)) => {
                let mut state = self.state.write().await;
                if state.generation == generation {
                    state.active = true;
                    state.last_error = None;
                    tracing::info!(url = %url, size = bytes.len(), "Camera stream connected");
                }
            }
            Err(err) => {
                let mut state = self.state.write().await;
                if state.generation == generation {
                    state.active = false;
                    tracing::warn!(
                        url = %url,
                        code = err.kind.code(),
                        details = %err.details,
                        "Camera stream connection failed"
                    );
                    state.last_error = Some(err);
                }
            }
        }

        Ok(self.status().await)
    }

    /// Tear down the current stream, cancelling autoscan
    pub async fn disconnect(&self) -> CameraFeedStatus {
        {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.active = false;
            state.autoscan = false;
            state.url = None;
            state.effective_url = None;
        }
        tracing::info!("Camera stream disconnected");
        self.status().await
    }

    /// Current controller status
    pub async fn status(&self) -> CameraFeedStatus {
        let state = self.state.read().await;
        CameraFeedStatus {
            connected: state.active,
            url: state.url.clone(),
            autoscan: state.autoscan,
            scanning: self.scanning.load(Ordering::SeqCst),
            last_error: state.last_error.clone(),
            last_outcome: state.last_outcome.clone(),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.active
    }

    /// Capture the current frame and run it through plate identification.
    ///
    /// At most one scan is in flight at a time; a concurrent call gets
    /// [`ScanOutcome::Busy`] without touching the stream.
    pub async fn scan(&self) -> ScanOutcome {
        let (active, generation, effective_url) = {
            let state = self.state.read().await;
            (state.active, state.generation, state.effective_url.clone())
        };
        let Some(effective_url) = effective_url.filter(|_| active) else {
            return ScanOutcome::NotConnected;
        };

        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return ScanOutcome::Busy;
        }

        let outcome = self.run_scan(&effective_url, generation).await;
        self.scanning.store(false, Ordering::SeqCst);

        let stale = {
            let mut state = self.state.write().await;
            let stale = state.generation != generation;
            if !stale {
                state.last_outcome = Some(outcome.clone());
            }
            stale
        };
        if !stale {
            self.hub
                .broadcast(HubMessage::ScanOutcome(outcome.clone()))
                .await;
        }
        outcome
    }

    async fn run_scan(&self, effective_url: &str, generation: u64) -> ScanOutcome {
        let (bytes, content_type) = match self.fetch_raw(effective_url).await {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(code = err.kind.code(), details = %err.details, "Frame capture failed");
                return ScanOutcome::Failed {
                    message: format!("Scan failed: {}", err.kind.message()),
                };
            }
        };

        let data_uri = to_data_uri(&content_type, &bytes);
        let plate = match self.ai_client.identify_plate(&data_uri).await {
            Ok(result) => result.license_plate.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Plate identification failed");
                return ScanOutcome::Failed {
                    message: "Scan failed: could not identify a plate".to_string(),
                };
            }
        };

        // Identification may resolve after a disconnect; don't mutate the
        // store on behalf of a torn-down stream.
        {
            let state = self.state.read().await;
            if state.generation != generation || !state.active {
                tracing::debug!(plate = %plate, "Discarding scan result for stale stream");
                return ScanOutcome::Failed {
                    message: "Scan superseded by reconnect".to_string(),
                };
            }
        }

        self.apply_identified_plate(plate).await
    }

    /// Apply an identified plate against the vehicle collection: inside
    /// vehicles exit, everything else enters, unknown plates leave the
    /// store untouched.
    async fn apply_identified_plate(&self, plate: String) -> ScanOutcome {
        match self.store.vehicle_by_plate(&plate).await {
            Some(vehicle) if vehicle.status == VehicleStatus::Inside => {
                self.store.exit_gate(vehicle.id).await;
                tracing::info!(plate = %plate, "Scan matched vehicle inside, exit invoked");
                ScanOutcome::Exited { plate }
            }
            Some(vehicle) => {
                self.store.enter_gate(vehicle.id).await;
                tracing::info!(plate = %plate, "Scan matched vehicle outside, entry invoked");
                ScanOutcome::Entered { plate }
            }
            None => {
                tracing::info!(plate = %plate, "Scanned vehicle not registered");
                ScanOutcome::NotRegistered { plate }
            }
        }
    }

    /// Enable or disable periodic automatic scanning
    pub async fn set_autoscan(&self, enabled: bool) -> CameraFeedStatus {
        {
            let mut state = self.state.write().await;
            state.autoscan = enabled;
        }
        if enabled {
            self.spawn_autoscan_loop().await;
        } else {
            tracing::info!("Autoscan disabled");
        }
        self.status().await
    }

    async fn spawn_autoscan_loop(&self) {
        {
            let mut running = self.loop_running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        tracing::info!(period_sec = AUTOSCAN_PERIOD.as_secs(), "Starting autoscan loop");

        let controller = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(AUTOSCAN_PERIOD);
            // interval fires immediately; the first scan should happen one
            // period after enabling
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let (enabled, active) = {
                    let state = controller.state.read().await;
                    (state.autoscan, state.active)
                };
                if !enabled {
                    break;
                }
                if !active {
                    // Losing the stream cancels further automatic triggers
                    let mut state = controller.state.write().await;
                    state.autoscan = false;
                    tracing::warn!("Autoscan cancelled: stream no longer active");
                    break;
                }
                if controller.scanning.load(Ordering::SeqCst) {
                    continue;
                }

                let outcome = controller.scan().await;
                tracing::debug!(outcome = ?outcome, "Automatic scan completed");
            }

            let mut running = controller.loop_running.write().await;
            *running = false;
            tracing::info!("Autoscan loop stopped");
        });
    }

    /// Fetch an image URL, classifying failures.
    ///
    /// Shared by the controller's own captures and the `/camera-proxy`
    /// relay. Returns the body and upstream content type (image/jpeg when
    /// the upstream does not say).
    pub async fn fetch_raw(
        &self,
        url: &str,
    ) -> std::result::Result<(Vec<u8>, String), StreamError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "image/jpeg, image/*, */*")
            .send()
            .await
            .map_err(|e| StreamError::from_kind(classify_fetch_error(&e)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(StreamError::with_details(
                StreamErrorKind::PermissionDenied,
                format!("Camera responded with status: {status}"),
            ));
        }
        if !status.is_success() {
            return Err(StreamError::with_details(
                StreamErrorKind::Other,
                format!("Camera responded with status: {status}"),
            ));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StreamError::with_details(classify_fetch_error(&e), e.to_string()))?;

        Ok((bytes.to_vec(), content_type))
    }
}

/// Build the URL the controller actually fetches
fn build_effective_url(strategy: FetchStrategy, proxy_base_url: &str, url: &str) -> String {
    match strategy {
        FetchStrategy::Direct => url.to_string(),
        FetchStrategy::Proxied => format!(
            "{}/camera-proxy?url={}",
            proxy_base_url.trim_end_matches('/'),
            urlencoding::encode(url)
        ),
    }
}

/// Encode a captured frame as a base64 data URI
fn to_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_controller(strategy: FetchStrategy) -> Arc<CameraFeedController> {
        let hub = Arc::new(RealtimeHub::new());
        let store = Arc::new(GateStore::new(hub.clone()));
        let ai_client = Arc::new(AiClient::new("http://localhost:9400".to_string()));
        Arc::new(CameraFeedController::new(
            store,
            ai_client,
            hub,
            strategy,
            "http://localhost:8080".to_string(),
            Duration::from_secs(2),
        ))
    }

    #[test]
    fn test_effective_url_direct() {
        let url = build_effective_url(
            FetchStrategy::Direct,
            "http://localhost:8080",
            "http://192.168.1.50/frame.jpg",
        );
        assert_eq!(url, "http://192.168.1.50/frame.jpg");
    }

    #[test]
    fn test_effective_url_proxied() {
        let url = build_effective_url(
            FetchStrategy::Proxied,
            "http://localhost:8080/",
            "http://192.168.1.50/frame.jpg?q=1",
        );
        assert_eq!(
            url,
            "http://localhost:8080/camera-proxy?url=http%3A%2F%2F192.168.1.50%2Fframe.jpg%3Fq%3D1"
        );
    }

    #[test]
    fn test_data_uri_encoding() {
        let uri = to_data_uri("image/jpeg", &[0xFF, 0xD8, 0xFF]);
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
        assert!(uri.starts_with("data:image/"));
    }

    #[tokio::test]
    async fn test_connect_rejects_missing_url() {
        let controller = test_controller(FetchStrategy::Direct);
        let result = controller.connect("   ".to_string()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_scan_without_stream_is_not_connected() {
        let controller = test_controller(FetchStrategy::Direct);
        let outcome = controller.scan().await;
        assert!(matches!(outcome, ScanOutcome::NotConnected));
    }

    #[tokio::test]
    async fn test_failed_connect_records_classified_error() {
        let controller = test_controller(FetchStrategy::Direct);
        // Port 1 on loopback is never listening
        let status = controller
            .connect("http://127.0.0.1:1/frame.jpg".to_string())
            .await
            .unwrap();

        assert!(!status.connected);
        let err = status.last_error.expect("error recorded");
        assert!(!err.details.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_plate_leaves_store_unchanged() {
        let controller = test_controller(FetchStrategy::Direct);
        let capacity_before = controller.store.gate_view().await.current_capacity;
        let notifications_before = controller.store.notifications().await.len();

        let outcome = controller
            .apply_identified_plate("XYZ 99999".to_string())
            .await;

        assert!(matches!(outcome, ScanOutcome::NotRegistered { .. }));
        assert_eq!(
            controller.store.gate_view().await.current_capacity,
            capacity_before
        );
        assert_eq!(
            controller.store.notifications().await.len(),
            notifications_before
        );
    }

    #[tokio::test]
    async fn test_identified_plate_outside_triggers_entry() {
        let controller = test_controller(FetchStrategy::Direct);

        let outcome = controller
            .apply_identified_plate("RAK 55555".to_string())
            .await;

        assert!(matches!(outcome, ScanOutcome::Entered { .. }));
        let vehicle = controller
            .store
            .vehicle_by_plate("RAK 55555")
            .await
            .unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Inside);
    }

    #[tokio::test]
    async fn test_identified_plate_inside_triggers_exit() {
        let controller = test_controller(FetchStrategy::Direct);

        let outcome = controller
            .apply_identified_plate("ABC 12345".to_string())
            .await;

        assert!(matches!(outcome, ScanOutcome::Exited { .. }));
        let vehicle = controller
            .store
            .vehicle_by_plate("ABC 12345")
            .await
            .unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Exited);
    }

    #[tokio::test]
    async fn test_autoscan_flag_toggles() {
        let controller = test_controller(FetchStrategy::Direct);
        let status = controller.set_autoscan(true).await;
        assert!(status.autoscan);
        let status = controller.set_autoscan(false).await;
        assert!(!status.autoscan);
    }
}

//! GateStore - Single Source of Truth for Dashboard State
//!
//! ## Responsibilities
//!
//! - Own all mutable domain state (vehicles, requests, notifications,
//!   attendance, schedules, gate status, capacity, session)
//! - Gate entry/exit transitions and capacity tracking
//! - Pickup request approval workflow
//! - Notification log + realtime broadcast
//!
//! All collections live behind one `RwLock`; every mutation is applied
//! atomically and is visible to all readers on the next access. Operations
//! with failed preconditions are silent no-ops (logged at debug), never
//! errors.

mod seed;
mod types;

pub use types::{
    is_valid_plate, Attendance, AttendanceStatus, GateStatus, Notification, NotificationId,
    NotificationKind, PickupRequest, RequestId, RequestStatus, ScheduleEntry, SchoolClass,
    Session, Student, SubmitRequestData, TeacherSchedule, UserRole, Vehicle, VehicleId,
    VehicleKind, VehicleStatus,
};

use crate::realtime_hub::{HubMessage, RealtimeHub};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum simultaneous vehicles on-site
pub const MAX_CAPACITY: usize = 5;

/// Dwell time before the gate auto-reverts to closed
pub const GATE_CLOSE_DELAY: Duration = Duration::from_secs(3);

const DEFAULT_TAB: &str = "dashboard";

/// Gate + capacity snapshot, the shared indicator shown on every dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateView {
    pub gate_status: GateStatus,
    pub current_capacity: usize,
    pub max_capacity: usize,
}

/// Registration payload for a new vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVehicleData {
    pub plate: String,
    pub driver: String,
    pub student: String,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
}

struct GateState {
    vehicles: Vec<Vehicle>,
    requests: Vec<PickupRequest>,
    notifications: Vec<Notification>,
    attendance: Vec<Attendance>,
    schedules: Vec<TeacherSchedule>,
    gate_status: GateStatus,
    current_capacity: usize,
    max_capacity: usize,
    session: Session,
    active_tab: String,
    next_notification_id: NotificationId,
    next_request_id: RequestId,
    next_vehicle_id: VehicleId,
    /// Bumped on every gate open; a scheduled close only fires when its
    /// generation still matches, so a later open supersedes it.
    gate_generation: u64,
}

impl GateState {
    fn gate_view(&self) -> GateView {
        GateView {
            gate_status: self.gate_status,
            current_capacity: self.current_capacity,
            max_capacity: self.max_capacity,
        }
    }

    fn open_gate(&mut self) -> u64 {
        self.gate_status = GateStatus::Open;
        self.gate_generation += 1;
        self.gate_generation
    }

    fn push_notification(
        &mut self,
        message: String,
        time: String,
        kind: NotificationKind,
    ) -> Notification {
        let notif = Notification {
            id: self.next_notification_id,
            message,
            time,
            kind,
        };
        self.next_notification_id += 1;
        // Newest first
        self.notifications.insert(0, notif.clone());
        notif
    }
}

/// GateStore instance
pub struct GateStore {
    state: Arc<RwLock<GateState>>,
    hub: Arc<RealtimeHub>,
}

impl GateStore {
    /// Create a store bootstrapped from the seed collections
    pub fn new(hub: Arc<RealtimeHub>) -> Self {
        let vehicles = seed::initial_vehicles();
        let current_capacity = vehicles
            .iter()
            .filter(|v| v.status == VehicleStatus::Inside)
            .count();
        let next_vehicle_id = vehicles.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        let requests = seed::initial_requests();
        let next_request_id = requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let notifications = seed::initial_notifications();
        let next_notification_id = notifications.iter().map(|n| n.id).max().unwrap_or(0) + 1;

        Self {
            state: Arc::new(RwLock::new(GateState {
                vehicles,
                requests,
                notifications,
                attendance: seed::initial_attendance(),
                schedules: seed::teacher_schedules(),
                gate_status: GateStatus::Closed,
                current_capacity,
                max_capacity: MAX_CAPACITY,
                session: Session::for_role(UserRole::Reception),
                active_tab: DEFAULT_TAB.to_string(),
                next_notification_id,
                next_request_id,
                next_vehicle_id,
                gate_generation: 0,
            })),
            hub,
        }
    }

    /// Admit a vehicle through the gate.
    ///
    /// No-op when the campus is at capacity, the vehicle is unknown, or the
    /// vehicle is already inside. Re-entry after an exit is allowed.
    pub async fn enter_gate(&self, vehicle_id: VehicleId) -> GateView {
        let (view, messages, generation) = {
            let mut state = self.state.write().await;

            if state.current_capacity >= state.max_capacity {
                tracing::debug!(vehicle_id, "Entry ignored: campus at capacity");
                return state.gate_view();
            }
            let Some(pos) = state.vehicles.iter().position(|v| v.id == vehicle_id) else {
                tracing::debug!(vehicle_id, "Entry ignored: unknown vehicle");
                return state.gate_view();
            };
            if state.vehicles[pos].status == VehicleStatus::Inside {
                tracing::debug!(vehicle_id, "Entry ignored: vehicle already inside");
                return state.gate_view();
            }

            let now = now_hhmm();
            let plate = state.vehicles[pos].plate.clone();
            {
                let vehicle = &mut state.vehicles[pos];
                vehicle.entry_time = Some(now.clone());
                vehicle.status = VehicleStatus::Inside;
                vehicle.last_updated = Utc::now();
            }
            state.current_capacity += 1;
            let generation = state.open_gate();

            let notif = state.push_notification(
                format!("Vehicle {plate} has entered campus"),
                now.clone(),
                NotificationKind::Entry,
            );
            for record in state
                .attendance
                .iter_mut()
                .filter(|r| r.vehicle_id == Some(vehicle_id))
            {
                record.entry = Some(now.clone());
                record.status = AttendanceStatus::Present;
            }

            tracing::info!(
                vehicle_id,
                plate = %plate,
                capacity = state.current_capacity,
                "Vehicle entered campus"
            );

            let view = state.gate_view();
            (
                view.clone(),
                vec![
                    HubMessage::Notification(notif),
                    HubMessage::GateUpdate(view),
                ],
                generation,
            )
        };

        self.schedule_gate_close(generation);
        for message in messages {
            self.hub.broadcast(message).await;
        }
        view
    }

    /// Release a vehicle through the gate.
    ///
    /// Accepted for any prior status; only an unknown vehicle id is ignored.
    /// Capacity is decremented only for vehicles that were actually inside,
    /// keeping it equal to the inside count, floored at zero.
    pub async fn exit_gate(&self, vehicle_id: VehicleId) -> GateView {
        let (view, messages, generation) = {
            let mut state = self.state.write().await;

            let Some(pos) = state.vehicles.iter().position(|v| v.id == vehicle_id) else {
                tracing::debug!(vehicle_id, "Exit ignored: unknown vehicle");
                return state.gate_view();
            };

            let now = now_hhmm();
            let plate = state.vehicles[pos].plate.clone();
            let was_inside = state.vehicles[pos].status == VehicleStatus::Inside;
            {
                let vehicle = &mut state.vehicles[pos];
                vehicle.exit_time = Some(now.clone());
                vehicle.status = VehicleStatus::Exited;
                vehicle.last_updated = Utc::now();
            }
            if was_inside {
                state.current_capacity = state.current_capacity.saturating_sub(1);
            }
            let generation = state.open_gate();

            let notif = state.push_notification(
                format!("Vehicle {plate} has exited campus"),
                now.clone(),
                NotificationKind::Exit,
            );
            for record in state
                .attendance
                .iter_mut()
                .filter(|r| r.vehicle_id == Some(vehicle_id))
            {
                record.exit = Some(now.clone());
            }

            tracing::info!(
                vehicle_id,
                plate = %plate,
                capacity = state.current_capacity,
                "Vehicle exited campus"
            );

            let view = state.gate_view();
            (
                view.clone(),
                vec![
                    HubMessage::Notification(notif),
                    HubMessage::GateUpdate(view),
                ],
                generation,
            )
        };

        self.schedule_gate_close(generation);
        for message in messages {
            self.hub.broadcast(message).await;
        }
        view
    }

    /// Close the gate if `generation` is still the latest open
    pub async fn close_gate(&self, generation: u64) {
        close_gate_if_current(&self.state, &self.hub, generation).await;
    }

    fn schedule_gate_close(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let hub = Arc::clone(&self.hub);
        tokio::spawn(async move {
            tokio::time::sleep(GATE_CLOSE_DELAY).await;
            close_gate_if_current(&state, &hub, generation).await;
        });
    }

    /// Submit a new pickup request. Status is forced to pending; the caller
    /// is navigated back to the default tab.
    pub async fn submit_request(&self, data: SubmitRequestData) -> PickupRequest {
        let (request, notif) = {
            let mut state = self.state.write().await;
            let request = PickupRequest {
                id: state.next_request_id,
                plate: data.plate,
                driver: data.driver,
                student: data.student,
                time: data.time,
                status: RequestStatus::Pending,
                kind: data.kind,
                excuse: data.excuse,
                submitted_at: data.submitted_at,
                approved_at: None,
                approved_by: None,
                denied_at: None,
                denied_by: None,
                denial_reason: None,
                last_updated: Utc::now(),
            };
            state.next_request_id += 1;
            state.requests.insert(0, request.clone());

            let notif = state.push_notification(
                format!("New pickup request for {}", request.plate),
                request.time.clone(),
                NotificationKind::Request,
            );
            state.active_tab = DEFAULT_TAB.to_string();

            tracing::info!(request_id = request.id, plate = %request.plate, "Pickup request submitted");
            (request, notif)
        };

        self.hub.broadcast(HubMessage::Notification(notif)).await;
        request
    }

    /// Approve a pending pickup request, stamping the acting session.
    ///
    /// Returns `None` without touching the request when it is unknown or
    /// already in a terminal state.
    pub async fn approve_request(&self, request_id: RequestId) -> Option<PickupRequest> {
        let (request, notif) = {
            let mut state = self.state.write().await;
            let actor = state.session.name.clone();
            let Some(pos) = state.requests.iter().position(|r| r.id == request_id) else {
                tracing::debug!(request_id, "Approval ignored: unknown request");
                return None;
            };
            if state.requests[pos].status != RequestStatus::Pending {
                tracing::debug!(request_id, "Approval ignored: request already resolved");
                return None;
            }

            let now = now_hhmm();
            let request = {
                let request = &mut state.requests[pos];
                request.status = RequestStatus::Approved;
                request.approved_at = Some(now.clone());
                request.approved_by = Some(actor);
                request.last_updated = Utc::now();
                request.clone()
            };

            let notif = state.push_notification(
                format!("Pickup request approved for {}", request.plate),
                now,
                NotificationKind::Approval,
            );

            tracing::info!(request_id, plate = %request.plate, "Pickup request approved");
            (request, notif)
        };

        self.hub.broadcast(HubMessage::Notification(notif)).await;
        Some(request)
    }

    /// Deny a pending pickup request with a free-text reason.
    ///
    /// Same terminal-state guard as [`approve_request`](Self::approve_request).
    pub async fn deny_request(
        &self,
        request_id: RequestId,
        reason: Option<String>,
    ) -> Option<PickupRequest> {
        let (request, notif) = {
            let mut state = self.state.write().await;
            let actor = state.session.name.clone();
            let Some(pos) = state.requests.iter().position(|r| r.id == request_id) else {
                tracing::debug!(request_id, "Denial ignored: unknown request");
                return None;
            };
            if state.requests[pos].status != RequestStatus::Pending {
                tracing::debug!(request_id, "Denial ignored: request already resolved");
                return None;
            }

            let now = now_hhmm();
            let reason = reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "Not specified".to_string());
            let request = {
                let request = &mut state.requests[pos];
                request.status = RequestStatus::Denied;
                request.denied_at = Some(now.clone());
                request.denied_by = Some(actor);
                request.denial_reason = Some(reason);
                request.last_updated = Utc::now();
                request.clone()
            };

            let notif = state.push_notification(
                format!("Pickup request denied for {}", request.plate),
                now,
                NotificationKind::Denial,
            );

            tracing::info!(request_id, plate = %request.plate, "Pickup request denied");
            (request, notif)
        };

        self.hub.broadcast(HubMessage::Notification(notif)).await;
        Some(request)
    }

    /// Switch the active role, resetting the session name and active tab
    pub async fn change_role(&self, role: UserRole) -> Session {
        let session = {
            let mut state = self.state.write().await;
            state.session = Session::for_role(role);
            state.active_tab = DEFAULT_TAB.to_string();
            state.session.clone()
        };
        tracing::info!(role = ?role, "Session role changed");
        self.hub
            .broadcast(HubMessage::SessionChanged(session.clone()))
            .await;
        session
    }

    pub async fn set_active_tab(&self, tab: String) {
        let mut state = self.state.write().await;
        state.active_tab = tab;
    }

    /// Register a new vehicle (status `registered`, no gate activity yet)
    pub async fn register_vehicle(&self, data: RegisterVehicleData) -> crate::Result<Vehicle> {
        if !is_valid_plate(&data.plate) {
            return Err(crate::Error::Validation(format!(
                "Plate '{}' does not match the expected format 'ABC 12345'",
                data.plate
            )));
        }
        let mut state = self.state.write().await;
        if state.vehicles.iter().any(|v| v.plate == data.plate) {
            return Err(crate::Error::Conflict(format!(
                "Plate {} is already registered",
                data.plate
            )));
        }
        let vehicle = Vehicle {
            id: state.next_vehicle_id,
            plate: data.plate,
            driver: data.driver,
            student: data.student,
            entry_time: None,
            exit_time: None,
            status: VehicleStatus::Registered,
            capacity: data.capacity,
            kind: data.kind,
            last_updated: Utc::now(),
        };
        state.next_vehicle_id += 1;
        state.vehicles.push(vehicle.clone());
        tracing::info!(vehicle_id = vehicle.id, plate = %vehicle.plate, "Vehicle registered");
        Ok(vehicle)
    }

    // ========================================
    // Read accessors (views never mutate directly)
    // ========================================

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.state.read().await.vehicles.clone()
    }

    pub async fn vehicle_by_plate(&self, plate: &str) -> Option<Vehicle> {
        self.state
            .read()
            .await
            .vehicles
            .iter()
            .find(|v| v.plate == plate)
            .cloned()
    }

    pub async fn requests(&self) -> Vec<PickupRequest> {
        self.state.read().await.requests.clone()
    }

    pub async fn request(&self, request_id: RequestId) -> Option<PickupRequest> {
        self.state
            .read()
            .await
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
    }

    /// Notifications, newest first
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    pub async fn attendance(&self) -> Vec<Attendance> {
        self.state.read().await.attendance.clone()
    }

    pub async fn schedules(&self) -> Vec<TeacherSchedule> {
        self.state.read().await.schedules.clone()
    }

    pub async fn gate_view(&self) -> GateView {
        self.state.read().await.gate_view()
    }

    pub async fn session(&self) -> Session {
        self.state.read().await.session.clone()
    }

    pub async fn active_tab(&self) -> String {
        self.state.read().await.active_tab.clone()
    }
}

async fn close_gate_if_current(state: &RwLock<GateState>, hub: &RealtimeHub, generation: u64) {
    let view = {
        let mut state = state.write().await;
        if state.gate_generation != generation || state.gate_status == GateStatus::Closed {
            return;
        }
        state.gate_status = GateStatus::Closed;
        state.gate_view()
    };
    hub.broadcast(HubMessage::GateUpdate(view)).await;
}

/// Wall-clock time of day for display fields (HH:MM)
fn now_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Arc<GateStore> {
        Arc::new(GateStore::new(Arc::new(RealtimeHub::new())))
    }

    async fn inside_count(store: &Arc<GateStore>) -> usize {
        store
            .vehicles()
            .await
            .iter()
            .filter(|v| v.status == VehicleStatus::Inside)
            .count()
    }

    fn submission(plate: &str) -> SubmitRequestData {
        SubmitRequestData {
            plate: plate.to_string(),
            driver: "Parent User".to_string(),
            student: "Emma Smith".to_string(),
            time: "14:10".to_string(),
            kind: VehicleKind::Car,
            excuse: "Doctor's appointment".to_string(),
            submitted_at: "13:45".to_string(),
        }
    }

    #[tokio::test]
    async fn test_capacity_matches_inside_count_after_seed() {
        let store = test_store();
        assert_eq!(store.gate_view().await.current_capacity, inside_count(&store).await);
    }

    #[tokio::test]
    async fn test_entry_of_registered_vehicle() {
        let store = test_store();
        let before = store.gate_view().await.current_capacity;

        let view = store.enter_gate(4).await;

        assert_eq!(view.current_capacity, before + 1);
        assert_eq!(view.gate_status, GateStatus::Open);

        let vehicle = store.vehicle_by_plate("RAK 55555").await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Inside);
        assert!(vehicle.entry_time.is_some());
        assert_eq!(view.current_capacity, inside_count(&store).await);
    }

    #[tokio::test]
    async fn test_entry_appends_exactly_one_notification() {
        let store = test_store();
        let before = store.notifications().await.len();

        store.enter_gate(4).await;

        let notifications = store.notifications().await;
        assert_eq!(notifications.len(), before + 1);
        assert_eq!(notifications[0].kind, NotificationKind::Entry);
        assert!(notifications[0].message.contains("RAK 55555"));
    }

    #[tokio::test]
    async fn test_entry_is_noop_when_already_inside() {
        let store = test_store();
        store.enter_gate(4).await;
        let before = store.notifications().await.len();

        let view = store.enter_gate(4).await;

        assert_eq!(view.current_capacity, inside_count(&store).await);
        assert_eq!(store.notifications().await.len(), before);
    }

    #[tokio::test]
    async fn test_entry_is_noop_for_unknown_vehicle() {
        let store = test_store();
        let before = store.gate_view().await;

        let view = store.enter_gate(999).await;

        assert_eq!(view.current_capacity, before.current_capacity);
        assert_eq!(view.gate_status, GateStatus::Closed);
    }

    #[tokio::test]
    async fn test_entry_rejected_at_capacity() {
        let store = test_store();
        // Fill the campus to the maximum of 5
        for n in 0..3u32 {
            let vehicle = store
                .register_vehicle(RegisterVehicleData {
                    plate: format!("FIL 0000{n}"),
                    driver: "Driver".to_string(),
                    student: "Student".to_string(),
                    capacity: 4,
                    kind: VehicleKind::Car,
                })
                .await
                .unwrap();
            store.enter_gate(vehicle.id).await;
        }
        let view = store.gate_view().await;
        assert_eq!(view.current_capacity, view.max_capacity);

        let before = store.notifications().await.len();
        let view = store.enter_gate(4).await;

        assert_eq!(view.current_capacity, view.max_capacity);
        assert_eq!(store.notifications().await.len(), before);
        let vehicle = store.vehicle_by_plate("RAK 55555").await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Registered);
        assert!(vehicle.entry_time.is_none());
    }

    #[tokio::test]
    async fn test_exit_succeeds_regardless_of_prior_status() {
        let store = test_store();
        // Vehicle 2 is seeded as exited; exiting again still succeeds
        let before = store.gate_view().await.current_capacity;

        let view = store.exit_gate(2).await;

        assert_eq!(view.current_capacity, before);
        assert_eq!(view.current_capacity, inside_count(&store).await);
        let notifications = store.notifications().await;
        assert_eq!(notifications[0].kind, NotificationKind::Exit);
    }

    #[tokio::test]
    async fn test_exit_decrements_capacity_for_inside_vehicle() {
        let store = test_store();
        let before = store.gate_view().await.current_capacity;

        let view = store.exit_gate(1).await;

        assert_eq!(view.current_capacity, before - 1);
        assert_eq!(view.current_capacity, inside_count(&store).await);
        let vehicle = store.vehicle_by_plate("ABC 12345").await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Exited);
        assert!(vehicle.exit_time.is_some());
    }

    #[tokio::test]
    async fn test_reentry_after_exit_is_allowed() {
        let store = test_store();
        store.exit_gate(1).await;

        let view = store.enter_gate(1).await;

        let vehicle = store.vehicle_by_plate("ABC 12345").await.unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Inside);
        assert_eq!(view.current_capacity, inside_count(&store).await);
    }

    #[tokio::test]
    async fn test_exit_updates_attendance_record() {
        let store = test_store();
        store.exit_gate(1).await;

        let attendance = store.attendance().await;
        let record = attendance
            .iter()
            .find(|r| r.vehicle_id == Some(1))
            .unwrap();
        assert!(record.exit.is_some());
    }

    #[tokio::test]
    async fn test_entry_marks_attendance_present() {
        let store = test_store();
        store.enter_gate(4).await;

        let attendance = store.attendance().await;
        let record = attendance
            .iter()
            .find(|r| r.vehicle_id == Some(4))
            .unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert!(record.entry.is_some());
    }

    #[tokio::test]
    async fn test_gate_close_ignores_stale_generation() {
        let store = test_store();
        store.enter_gate(4).await; // generation 1
        store.exit_gate(4).await; // generation 2

        store.close_gate(1).await;
        assert_eq!(store.gate_view().await.gate_status, GateStatus::Open);

        store.close_gate(2).await;
        assert_eq!(store.gate_view().await.gate_status, GateStatus::Closed);
    }

    #[tokio::test]
    async fn test_submit_request_round_trip() {
        let store = test_store();
        let before = store.notifications().await.len();

        let submitted = store.submit_request(submission("FUJ 91234")).await;

        let requests = store.requests().await;
        assert_eq!(requests[0].id, submitted.id);
        assert_eq!(requests[0].status, RequestStatus::Pending);

        let approved = store.approve_request(submitted.id).await.unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(approved.approved_at.is_some());
        assert_eq!(approved.approved_by.as_deref(), Some("Staff Member"));

        let notifications = store.notifications().await;
        assert_eq!(notifications.len(), before + 2);
        assert_eq!(notifications[0].kind, NotificationKind::Approval);
        assert!(notifications[0].message.contains("FUJ 91234"));
    }

    #[tokio::test]
    async fn test_deny_request_records_reason() {
        let store = test_store();
        let submitted = store.submit_request(submission("SHJ 11223")).await;

        let denied = store
            .deny_request(submitted.id, Some("No valid reason provided".to_string()))
            .await
            .unwrap();

        assert_eq!(denied.status, RequestStatus::Denied);
        assert_eq!(
            denied.denial_reason.as_deref(),
            Some("No valid reason provided")
        );
        assert_eq!(denied.denied_by.as_deref(), Some("Staff Member"));
    }

    #[tokio::test]
    async fn test_deny_without_reason_defaults() {
        let store = test_store();
        let submitted = store.submit_request(submission("AJM 44556")).await;

        let denied = store.deny_request(submitted.id, None).await.unwrap();
        assert_eq!(denied.denial_reason.as_deref(), Some("Not specified"));
    }

    #[tokio::test]
    async fn test_resolved_requests_are_terminal() {
        let store = test_store();
        let submitted = store.submit_request(submission("FUJ 91234")).await;
        store.approve_request(submitted.id).await.unwrap();
        let before = store.notifications().await.len();

        assert!(store.deny_request(submitted.id, None).await.is_none());
        assert!(store.approve_request(submitted.id).await.is_none());

        let request = store.request(submitted.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert!(request.denied_at.is_none());
        assert_eq!(store.notifications().await.len(), before);
    }

    #[tokio::test]
    async fn test_approve_unknown_request_is_noop() {
        let store = test_store();
        assert!(store.approve_request(999).await.is_none());
    }

    #[tokio::test]
    async fn test_change_role_resets_session_and_tab() {
        let store = test_store();
        store.set_active_tab("live-feed".to_string()).await;

        let session = store.change_role(UserRole::Parent).await;

        assert_eq!(session.role, UserRole::Parent);
        assert_eq!(session.name, "Parent User");
        assert_eq!(store.active_tab().await, "dashboard");
    }

    #[tokio::test]
    async fn test_register_vehicle_rejects_bad_plate() {
        let store = test_store();
        let result = store
            .register_vehicle(RegisterVehicleData {
                plate: "bad-plate".to_string(),
                driver: "Driver".to_string(),
                student: "Student".to_string(),
                capacity: 4,
                kind: VehicleKind::Car,
            })
            .await;
        assert!(matches!(result, Err(crate::Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_vehicle_rejects_duplicate_plate() {
        let store = test_store();
        let result = store
            .register_vehicle(RegisterVehicleData {
                plate: "RAK 55555".to_string(),
                driver: "Driver".to_string(),
                student: "Student".to_string(),
                capacity: 4,
                kind: VehicleKind::Car,
            })
            .await;
        assert!(matches!(result, Err(crate::Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_inside_vehicles_always_have_entry_time() {
        let store = test_store();
        store.enter_gate(4).await;
        store.exit_gate(1).await;
        store.enter_gate(1).await;

        for vehicle in store.vehicles().await {
            if vehicle.status == VehicleStatus::Inside {
                assert!(vehicle.entry_time.is_some(), "vehicle {}", vehicle.plate);
            }
        }
    }
}

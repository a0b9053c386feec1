//! Domain types for the gate dashboard
//!
//! Plate strings are the natural join key between vehicles, pickup requests
//! and scan results. Regional format: three letters, a space, five digits
//! ("ABC 12345").

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type VehicleId = u64;
pub type RequestId = u64;
pub type NotificationId = u64;

/// Dashboard role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Parent,
    Teacher,
    Reception,
}

/// Active session (role + display name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub role: UserRole,
    pub name: String,
}

impl Session {
    /// Default display name per role
    pub fn for_role(role: UserRole) -> Self {
        let name = match role {
            UserRole::Parent => "Parent User",
            UserRole::Teacher => "Teacher Name",
            UserRole::Reception => "Staff Member",
        };
        Self {
            role,
            name: name.to_string(),
        }
    }
}

/// Vehicle lifecycle: registered -> inside -> exited (re-entry allowed from exited)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Registered,
    Inside,
    Exited,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Car,
    Bus,
}

/// Registered vehicle
///
/// Invariant: `status == Inside` implies `entry_time` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate: String,
    pub driver: String,
    pub student: String,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub status: VehicleStatus,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
    pub last_updated: DateTime<Utc>,
}

/// Pickup request status: pending -> approved | denied, terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

/// Early-pickup request submitted by a parent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub id: RequestId,
    pub plate: String,
    pub driver: String,
    pub student: String,
    pub time: String,
    pub status: RequestStatus,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
    pub excuse: String,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denied_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denied_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Submission payload for a new pickup request. Status is forced to pending
/// by the store; the excuse-required-after-cutoff rule is enforced by the
/// submitting view, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestData {
    pub plate: String,
    pub driver: String,
    pub student: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: VehicleKind,
    pub excuse: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Entry,
    Exit,
    Approval,
    Denial,
    Request,
}

/// Append-only activity log entry, never mutated after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "present")]
    Present,
    #[serde(rename = "absent")]
    Absent,
    #[serde(rename = "early departure")]
    EarlyDeparture,
}

/// Per-student daily attendance record.
///
/// `vehicle_id` is a non-owning back-reference resolved by lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub student: String,
    pub date: NaiveDate,
    pub entry: Option<String>,
    pub exit: Option<String>,
    pub status: AttendanceStatus,
    pub vehicle_id: Option<VehicleId>,
}

/// Gate open/closed state. Transient UI signal, auto-reverts to closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    pub name: String,
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub day: String,
    pub time: String,
    pub class_name: String,
    pub room: String,
}

/// Weekly schedule and class roster for one teacher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherSchedule {
    pub teacher: String,
    pub schedule: Vec<ScheduleEntry>,
    pub classes: Vec<SchoolClass>,
}

/// Check the regional plate format: three ASCII uppercase letters, one
/// space, five digits.
pub fn is_valid_plate(plate: &str) -> bool {
    let bytes = plate.as_bytes();
    bytes.len() == 9
        && bytes[..3].iter().all(|b| b.is_ascii_uppercase())
        && bytes[3] == b' '
        && bytes[4..].iter().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_format() {
        assert!(is_valid_plate("ABC 12345"));
        assert!(is_valid_plate("FUJ 91234"));
        assert!(!is_valid_plate("ABC12345"));
        assert!(!is_valid_plate("abc 12345"));
        assert!(!is_valid_plate("AB 123456"));
        assert!(!is_valid_plate("ABC 1234"));
        assert!(!is_valid_plate(""));
    }

    #[test]
    fn test_session_role_names() {
        assert_eq!(Session::for_role(UserRole::Parent).name, "Parent User");
        assert_eq!(Session::for_role(UserRole::Teacher).name, "Teacher Name");
        assert_eq!(Session::for_role(UserRole::Reception).name, "Staff Member");
    }

    #[test]
    fn test_attendance_status_wire_format() {
        let json = serde_json::to_string(&AttendanceStatus::EarlyDeparture).unwrap();
        assert_eq!(json, "\"early departure\"");
    }

    #[test]
    fn test_notification_wire_format() {
        let notif = Notification {
            id: 7,
            message: "Vehicle ABC 12345 has entered campus".to_string(),
            time: "08:15".to_string(),
            kind: NotificationKind::Entry,
        };
        let json = serde_json::to_value(&notif).unwrap();
        assert_eq!(json["type"], "entry");
        assert_eq!(json["id"], 7);
    }
}

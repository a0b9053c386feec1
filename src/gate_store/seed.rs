//! Fixed bootstrap collections for the in-memory store
//!
//! There is no persistence layer; every page session starts from these
//! collections.

use chrono::{NaiveDate, Utc};

use super::types::{
    Attendance, AttendanceStatus, Notification, NotificationKind, PickupRequest, RequestStatus,
    ScheduleEntry, SchoolClass, Student, TeacherSchedule, Vehicle, VehicleKind, VehicleStatus,
};

pub fn initial_vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: 1,
            plate: "ABC 12345".to_string(),
            driver: "John Smith".to_string(),
            student: "Emma Smith".to_string(),
            entry_time: Some("08:15".to_string()),
            exit_time: None,
            status: VehicleStatus::Inside,
            capacity: 4,
            kind: VehicleKind::Car,
            last_updated: Utc::now(),
        },
        Vehicle {
            id: 2,
            plate: "XYZ 78901".to_string(),
            driver: "Lisa Johnson".to_string(),
            student: "Michael Johnson".to_string(),
            entry_time: Some("08:20".to_string()),
            exit_time: Some("15:25".to_string()),
            status: VehicleStatus::Exited,
            capacity: 5,
            kind: VehicleKind::Car,
            last_updated: Utc::now(),
        },
        Vehicle {
            id: 3,
            plate: "BUS 00001".to_string(),
            driver: "Robert Chen".to_string(),
            student: "Bus Route 1".to_string(),
            entry_time: Some("08:05".to_string()),
            exit_time: None,
            status: VehicleStatus::Inside,
            capacity: 50,
            kind: VehicleKind::Bus,
            last_updated: Utc::now(),
        },
        Vehicle {
            id: 4,
            plate: "RAK 55555".to_string(),
            driver: "New Driver".to_string(),
            student: "New Student".to_string(),
            entry_time: None,
            exit_time: None,
            status: VehicleStatus::Registered,
            capacity: 4,
            kind: VehicleKind::Car,
            last_updated: Utc::now(),
        },
    ]
}

pub fn initial_requests() -> Vec<PickupRequest> {
    vec![
        PickupRequest {
            id: 1,
            plate: "JKL 34567".to_string(),
            driver: "David Wilson".to_string(),
            student: "Olivia Wilson".to_string(),
            time: "14:10".to_string(),
            status: RequestStatus::Approved,
            kind: VehicleKind::Car,
            excuse: "Doctor's appointment at 2:30 PM".to_string(),
            submitted_at: "13:45".to_string(),
            approved_at: Some("13:50".to_string()),
            approved_by: Some("Receptionist".to_string()),
            denied_at: None,
            denied_by: None,
            denial_reason: None,
            last_updated: Utc::now(),
        },
        PickupRequest {
            id: 2,
            plate: "MNO 67890".to_string(),
            driver: "Sarah Brown".to_string(),
            student: "James Brown".to_string(),
            time: "14:05".to_string(),
            status: RequestStatus::Denied,
            kind: VehicleKind::Car,
            excuse: "Family emergency".to_string(),
            submitted_at: "13:30".to_string(),
            approved_at: None,
            approved_by: None,
            denied_at: Some("13:35".to_string()),
            denied_by: Some("Receptionist".to_string()),
            denial_reason: Some("No valid reason provided".to_string()),
            last_updated: Utc::now(),
        },
        PickupRequest {
            id: 3,
            plate: "PQR 91234".to_string(),
            driver: "Parent User".to_string(),
            student: "Student Name".to_string(),
            time: "13:55".to_string(),
            status: RequestStatus::Pending,
            kind: VehicleKind::Car,
            excuse: "Dentist appointment.".to_string(),
            submitted_at: "13:55".to_string(),
            approved_at: None,
            approved_by: None,
            denied_at: None,
            denied_by: None,
            denial_reason: None,
            last_updated: Utc::now(),
        },
    ]
}

pub fn initial_notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            message: "Vehicle ABC 12345 has entered campus".to_string(),
            time: "08:15".to_string(),
            kind: NotificationKind::Entry,
        },
        Notification {
            id: 2,
            message: "Pickup request approved for JKL 34567".to_string(),
            time: "13:50".to_string(),
            kind: NotificationKind::Approval,
        },
        Notification {
            id: 3,
            message: "Vehicle XYZ 78901 has exited campus".to_string(),
            time: "15:25".to_string(),
            kind: NotificationKind::Exit,
        },
    ]
}

pub fn initial_attendance() -> Vec<Attendance> {
    let date = NaiveDate::from_ymd_opt(2025, 9, 9).unwrap_or_default();
    let record = |student: &str,
                  entry: Option<&str>,
                  exit: Option<&str>,
                  status: AttendanceStatus,
                  vehicle_id: Option<u64>| Attendance {
        student: student.to_string(),
        date,
        entry: entry.map(str::to_string),
        exit: exit.map(str::to_string),
        status,
        vehicle_id,
    };

    vec![
        record(
            "Nada Khaled Alblooshi",
            Some("8:05"),
            None,
            AttendanceStatus::Present,
            Some(1),
        ),
        record(
            "Maitha Hazza Alhebsi",
            Some("8:07"),
            None,
            AttendanceStatus::Present,
            None,
        ),
        record("Meera Saleh Aljabri", None, None, AttendanceStatus::Absent, None),
        record(
            "Dana Mohammed Alsayari",
            Some("8:12"),
            Some("14:15"),
            AttendanceStatus::EarlyDeparture,
            Some(2),
        ),
        record(
            "Reem Mohammed Alsayari",
            Some("8:10"),
            None,
            AttendanceStatus::Present,
            None,
        ),
        record(
            "Taif Said Alshamsi",
            Some("8:11"),
            None,
            AttendanceStatus::Present,
            None,
        ),
        record("Maitha Saleh Alsayari", None, None, AttendanceStatus::Absent, None),
        record(
            "Shaikha Abdullah Alshamsi",
            Some("8:01"),
            None,
            AttendanceStatus::Present,
            None,
        ),
        record(
            "Salama Mohammed Aljenibi",
            Some("8:03"),
            None,
            AttendanceStatus::Present,
            Some(4),
        ),
    ]
}

pub fn teacher_schedules() -> Vec<TeacherSchedule> {
    let entry = |day: &str, time: &str, class_name: &str, room: &str| ScheduleEntry {
        day: day.to_string(),
        time: time.to_string(),
        class_name: class_name.to_string(),
        room: room.to_string(),
    };
    let class = |name: &str, students: &[&str]| SchoolClass {
        name: name.to_string(),
        students: students
            .iter()
            .map(|s| Student {
                name: s.to_string(),
            })
            .collect(),
    };

    vec![TeacherSchedule {
        teacher: "Laila Zuaiter".to_string(),
        schedule: vec![
            entry("Monday", "08:00 - 09:30", "12 CAI 51", "A-201"),
            entry("Monday", "10:00 - 11:30", "11 CAI 51", "A-203"),
            entry("Tuesday", "09:30 - 11:00", "10 CAI 51", "B-105"),
            entry("Wednesday", "08:00 - 09:30", "9 ADV 56", "C-302"),
            entry("Thursday", "09:00 - 10:30", "9 ADV 58", "D-110"),
            entry("Friday", "08:30 - 10:00", "8 ADV 55", "D-115"),
        ],
        classes: vec![
            class(
                "12 CAI 51",
                &[
                    "Nada Khaled Alblooshi",
                    "Maitha Hazza Alhebsi",
                    "Meera Saleh Aljabri",
                ],
            ),
            class(
                "11 CAI 51",
                &[
                    "Dana Mohammed Alsayari",
                    "Reem Mohammed Alsayari",
                    "Taif Said Alshamsi",
                ],
            ),
            class(
                "10 CAI 51",
                &[
                    "Maitha Saleh Alsayari",
                    "Shaikha Abdullah Alshamsi",
                    "Salama Mohammed Aljenibi",
                ],
            ),
        ],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_capacity_matches_inside_count() {
        let inside = initial_vehicles()
            .iter()
            .filter(|v| v.status == VehicleStatus::Inside)
            .count();
        assert_eq!(inside, 2);
    }

    #[test]
    fn test_seed_plates_are_well_formed() {
        for vehicle in initial_vehicles() {
            assert!(
                super::super::types::is_valid_plate(&vehicle.plate),
                "bad plate {}",
                vehicle.plate
            );
        }
        for request in initial_requests() {
            assert!(super::super::types::is_valid_plate(&request.plate));
        }
    }

    #[test]
    fn test_seed_inside_vehicles_have_entry_time() {
        for vehicle in initial_vehicles() {
            if vehicle.status == VehicleStatus::Inside {
                assert!(vehicle.entry_time.is_some());
            }
        }
    }
}

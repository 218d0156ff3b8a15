//! Composite filters exposed to clients: the doctor directory filter and a
//! patient's appointment filter. Path arguments arrive as strings in which
//! `"null"`, blank, and absent all mean "not given".

use rusqlite::Connection;

use crate::availability::slot_start_hour;
use crate::db::{
    find_doctors_by_name_and_specialty, find_doctors_by_name_like, find_doctors_by_specialty,
    list_doctors, list_patient_dtos, list_patient_dtos_by_doctor_name,
    list_patient_dtos_by_doctor_name_and_status, list_patient_dtos_by_status, DatabaseError,
};
use crate::models::{AppointmentDto, AppointmentFilter, AppointmentStatus, Doctor, DoctorFilter, TimeOfDay};

/// Trimmed argument, or `None` for blank and the literal `null`.
pub fn normalize_filter(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn doctor_filter(name: &str, time: &str, specialty: &str) -> DoctorFilter {
    DoctorFilter {
        name: normalize_filter(name),
        specialty: normalize_filter(specialty),
        time: normalize_filter(time),
    }
}

pub fn appointment_filter(condition: &str, doctor_name: &str) -> AppointmentFilter {
    AppointmentFilter {
        status: normalize_filter(condition).map(|c| AppointmentStatus::from_condition(&c)),
        doctor_name: normalize_filter(doctor_name),
    }
}

/// Keep doctors with at least one slot starting in the requested half of
/// the day. `None` keeps everyone.
pub fn filter_by_time(doctors: Vec<Doctor>, time: Option<TimeOfDay>) -> Vec<Doctor> {
    let Some(time) = time else {
        return doctors;
    };
    doctors
        .into_iter()
        .filter(|d| {
            d.available_times
                .iter()
                .filter_map(|slot| slot_start_hour(slot.trim()))
                .any(|hour| time.contains_hour(hour))
        })
        .collect()
}

/// Name alone uses SQL `LIKE`; name with specialty uses a literal
/// case-insensitive substring.
pub fn filter_doctors(conn: &Connection, filter: &DoctorFilter) -> Result<Vec<Doctor>, DatabaseError> {
    let doctors = match (filter.name.as_deref(), filter.specialty.as_deref()) {
        (None, None) => list_doctors(conn)?,
        (Some(name), Some(specialty)) => find_doctors_by_name_and_specialty(conn, name, specialty)?,
        (Some(name), None) => find_doctors_by_name_like(conn, name)?,
        (None, Some(specialty)) => find_doctors_by_specialty(conn, specialty)?,
    };
    Ok(filter_by_time(doctors, filter.time_of_day()))
}

pub fn filter_patient_appointments(
    conn: &Connection,
    patient_id: i64,
    filter: &AppointmentFilter,
) -> Result<Vec<AppointmentDto>, DatabaseError> {
    match (filter.status, filter.doctor_name.as_deref()) {
        (Some(status), Some(name)) => {
            list_patient_dtos_by_doctor_name_and_status(conn, patient_id, name, status)
        }
        (Some(status), None) => list_patient_dtos_by_status(conn, patient_id, status),
        (None, Some(name)) => list_patient_dtos_by_doctor_name(conn, patient_id, name),
        (None, None) => list_patient_dtos(conn, patient_id),
    }
}

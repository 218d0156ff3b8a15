use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::{
    format_appointment_time, parse_appointment_time, Appointment, AppointmentDto, AppointmentStatus,
};

fn time_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_appointment_time(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("bad appointment_time {raw}").into(),
        )
    })
}

fn status_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<AppointmentStatus> {
    let code: u8 = row.get(idx)?;
    AppointmentStatus::try_from(code)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        appointment_time: time_from_column(row, 3)?,
        status: status_from_column(row, 4)?,
    })
}

fn dto_from_row(row: &Row<'_>) -> rusqlite::Result<AppointmentDto> {
    Ok(AppointmentDto {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        doctor_name: row.get(2)?,
        patient_id: row.get(3)?,
        patient_name: row.get(4)?,
        patient_email: row.get(5)?,
        patient_phone: row.get(6)?,
        patient_address: row.get(7)?,
        appointment_time: time_from_column(row, 8)?,
        status: status_from_column(row, 9)?,
    })
}

const DTO_SELECT: &str = "SELECT a.id, d.id, d.name, p.id, p.name, p.email, p.phone, p.address,
        a.appointment_time, a.status
     FROM appointments a
     JOIN doctors d ON a.doctor_id = d.id
     JOIN patients p ON a.patient_id = p.id";

fn query_dtos<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<AppointmentDto>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, dto_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn slot_taken(e: rusqlite::Error, doctor_id: i64, time: &NaiveDateTime) -> DatabaseError {
    if is_unique_violation(&e) {
        DatabaseError::ConstraintViolation(format!(
            "doctor {doctor_id} already booked at {}",
            format_appointment_time(time)
        ))
    } else {
        DatabaseError::from(e)
    }
}

/// Insert a booking. A second booking for the same doctor and start time
/// is reported as `ConstraintViolation`.
pub fn insert_appointment(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
    time: &NaiveDateTime,
    status: AppointmentStatus,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (doctor_id, patient_id, appointment_time, status)
         VALUES (?1, ?2, ?3, ?4)",
        params![doctor_id, patient_id, format_appointment_time(time), status.code()],
    )
    .map_err(|e| slot_taken(e, doctor_id, time))?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite doctor, patient, time and status of an existing row.
pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE appointments
             SET doctor_id = ?1, patient_id = ?2, appointment_time = ?3, status = ?4
             WHERE id = ?5",
            params![
                appt.doctor_id,
                appt.patient_id,
                format_appointment_time(&appt.appointment_time),
                appt.status.code(),
                appt.id,
            ],
        )
        .map_err(|e| slot_taken(e, appt.doctor_id, &appt.appointment_time))?;
    Ok(changed > 0)
}

pub fn set_appointment_status(
    conn: &Connection,
    id: i64,
    status: AppointmentStatus,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE id = ?2",
        params![status.code(), id],
    )?;
    Ok(changed > 0)
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    conn.query_row(
        "SELECT id, doctor_id, patient_id, appointment_time, status FROM appointments WHERE id = ?1",
        params![id],
        appointment_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn delete_appointment(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let changed = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

pub fn delete_appointments_for_doctor(conn: &Connection, doctor_id: i64) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM appointments WHERE doctor_id = ?1", params![doctor_id])?)
}

/// Appointments of `doctor_id` starting in `[start, end)`, earliest first.
pub fn list_doctor_appointments_between(
    conn: &Connection,
    doctor_id: i64,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, doctor_id, patient_id, appointment_time, status FROM appointments
         WHERE doctor_id = ?1 AND appointment_time >= ?2 AND appointment_time < ?3
         ORDER BY appointment_time ASC",
    )?;
    let rows = stmt.query_map(
        params![doctor_id, format_appointment_time(start), format_appointment_time(end)],
        appointment_from_row,
    )?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Doctor's day view. `patient_name` narrows by case-insensitive substring.
pub fn list_doctor_day_dtos(
    conn: &Connection,
    doctor_id: i64,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    patient_name: Option<&str>,
) -> Result<Vec<AppointmentDto>, DatabaseError> {
    let start = format_appointment_time(start);
    let end = format_appointment_time(end);
    match patient_name {
        None => query_dtos(
            conn,
            &format!(
                "{DTO_SELECT}
                 WHERE a.doctor_id = ?1 AND a.appointment_time >= ?2 AND a.appointment_time < ?3
                 ORDER BY a.appointment_time ASC"
            ),
            params![doctor_id, start, end],
        ),
        Some(name) => query_dtos(
            conn,
            &format!(
                "{DTO_SELECT}
                 WHERE a.doctor_id = ?1 AND a.appointment_time >= ?2 AND a.appointment_time < ?3
                   AND instr(fold_case(p.name), fold_case(?4)) > 0
                 ORDER BY a.appointment_time ASC"
            ),
            params![doctor_id, start, end, name],
        ),
    }
}

pub fn list_patient_dtos(conn: &Connection, patient_id: i64) -> Result<Vec<AppointmentDto>, DatabaseError> {
    query_dtos(
        conn,
        &format!("{DTO_SELECT} WHERE a.patient_id = ?1 ORDER BY a.id ASC"),
        params![patient_id],
    )
}

pub fn list_patient_dtos_by_status(
    conn: &Connection,
    patient_id: i64,
    status: AppointmentStatus,
) -> Result<Vec<AppointmentDto>, DatabaseError> {
    query_dtos(
        conn,
        &format!(
            "{DTO_SELECT} WHERE a.patient_id = ?1 AND a.status = ?2
             ORDER BY a.appointment_time ASC"
        ),
        params![patient_id, status.code()],
    )
}

pub fn list_patient_dtos_by_doctor_name(
    conn: &Connection,
    patient_id: i64,
    doctor_name: &str,
) -> Result<Vec<AppointmentDto>, DatabaseError> {
    query_dtos(
        conn,
        &format!(
            "{DTO_SELECT} WHERE a.patient_id = ?1 AND instr(fold_case(d.name), fold_case(?2)) > 0
             ORDER BY a.id ASC"
        ),
        params![patient_id, doctor_name],
    )
}

pub fn list_patient_dtos_by_doctor_name_and_status(
    conn: &Connection,
    patient_id: i64,
    doctor_name: &str,
    status: AppointmentStatus,
) -> Result<Vec<AppointmentDto>, DatabaseError> {
    query_dtos(
        conn,
        &format!(
            "{DTO_SELECT} WHERE a.patient_id = ?1 AND instr(fold_case(d.name), fold_case(?2)) > 0
               AND a.status = ?3
             ORDER BY a.appointment_time ASC"
        ),
        params![patient_id, doctor_name, status.code()],
    )
}

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::{Doctor, DoctorForm};

const DOCTOR_COLUMNS: &str = "id, name, email, phone, password, specialty, available_times";

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    let raw_times: String = row.get(6)?;
    let available_times: Vec<String> = serde_json::from_str(&raw_times)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password: row.get(4)?,
        specialty: row.get(5)?,
        available_times,
    })
}

fn encode_times(times: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(times).map_err(|e| DatabaseError::InvalidValue {
        field: "available_times".into(),
        value: e.to_string(),
    })
}

fn email_taken(e: rusqlite::Error, email: &str) -> DatabaseError {
    if is_unique_violation(&e) {
        DatabaseError::ConstraintViolation(format!("doctor email {email} already registered"))
    } else {
        DatabaseError::from(e)
    }
}

fn query_doctors<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, doctor_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn insert_doctor(conn: &Connection, doctor: &DoctorForm) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (name, email, phone, password, specialty, available_times)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doctor.name,
            doctor.email,
            doctor.phone,
            doctor.password,
            doctor.specialty,
            encode_times(&doctor.available_times)?,
        ],
    )
    .map_err(|e| email_taken(e, &doctor.email))?;
    Ok(conn.last_insert_rowid())
}

/// Replace every mutable column of doctor `id`. Returns false when no row matched.
pub fn update_doctor(conn: &Connection, id: i64, doctor: &DoctorForm) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors
         SET name = ?1, email = ?2, phone = ?3, password = ?4, specialty = ?5, available_times = ?6
         WHERE id = ?7",
        params![
            doctor.name,
            doctor.email,
            doctor.phone,
            doctor.password,
            doctor.specialty,
            encode_times(&doctor.available_times)?,
            id,
        ],
    )
    .map_err(|e| email_taken(e, &doctor.email))?;
    Ok(changed > 0)
}

pub fn delete_doctor(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let changed = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"),
        params![id],
        doctor_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn get_doctor_by_email(conn: &Connection, email: &str) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1"),
        params![email],
        doctor_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY id"),
        [],
    )
}

/// `name LIKE %fragment%` after Unicode case folding. The fragment is passed
/// through unescaped, so `%` and `_` inside it act as wildcards.
pub fn find_doctors_by_name_like(conn: &Connection, fragment: &str) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE fold_case(name) LIKE '%' || fold_case(?1) || '%' ORDER BY id"),
        params![fragment],
    )
}

/// Case-insensitive literal substring on name and case-insensitive equality on specialty.
pub fn find_doctors_by_name_and_specialty(
    conn: &Connection,
    fragment: &str,
    specialty: &str,
) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors
             WHERE instr(fold_case(name), fold_case(?1)) > 0 AND fold_case(specialty) = fold_case(?2)
             ORDER BY id"
        ),
        params![fragment, specialty],
    )
}

pub fn find_doctors_by_specialty(conn: &Connection, specialty: &str) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE fold_case(specialty) = fold_case(?1) ORDER BY id"),
        params![specialty],
    )
}

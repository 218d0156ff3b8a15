use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::{NewPatient, Patient};

const PATIENT_COLUMNS: &str = "id, name, email, phone, password, address";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password: row.get(4)?,
        address: row.get(5)?,
    })
}

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, email, phone, password, address)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient.name,
            patient.email,
            patient.phone,
            patient.password,
            patient.address,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::ConstraintViolation("patient email or phone already registered".into())
        } else {
            DatabaseError::from(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"),
        params![id],
        patient_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn get_patient_by_email(conn: &Connection, email: &str) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1"),
        params![email],
        patient_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn find_patient_by_email_or_phone(
    conn: &Connection,
    email: &str,
    phone: &str,
) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1 OR phone = ?2 LIMIT 1"),
        params![email, phone],
        patient_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

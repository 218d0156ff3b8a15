use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{is_unique_violation, DatabaseError};
use crate::models::{Prescription, PrescriptionForm};

/// Insert a prescription. A second prescription for the same appointment
/// is reported as `ConstraintViolation`.
pub fn insert_prescription(
    conn: &Connection,
    appointment_id: i64,
    form: &PrescriptionForm,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (patient_name, appointment_id, medication, dosage, doctor_notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            form.patient_name,
            appointment_id,
            form.medication,
            form.dosage,
            form.doctor_notes,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::ConstraintViolation(format!(
                "prescription already recorded for appointment {appointment_id}"
            ))
        } else {
            DatabaseError::from(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

/// First prescription recorded for the appointment, by insertion order.
pub fn get_prescription_by_appointment(
    conn: &Connection,
    appointment_id: i64,
) -> Result<Option<Prescription>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_name, appointment_id, medication, dosage, doctor_notes
         FROM prescriptions WHERE appointment_id = ?1
         ORDER BY id ASC LIMIT 1",
        params![appointment_id],
        |row| {
            Ok(Prescription {
                id: row.get(0)?,
                patient_name: row.get(1)?,
                appointment_id: row.get(2)?,
                medication: row.get(3)?,
                dosage: row.get(4)?,
                doctor_notes: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

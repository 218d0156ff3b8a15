//! Doctor directory administration and patient self-registration.

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{
    delete_appointments_for_doctor, delete_doctor as delete_doctor_row, find_patient_by_email_or_phone,
    get_doctor, get_doctor_by_email, get_patient, insert_doctor, insert_patient, list_doctors,
    update_doctor as update_doctor_row, write_transaction, DatabaseError,
};
use crate::models::{Doctor, DoctorForm, NewPatient, Patient};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Doctor already exists")]
    DoctorExists,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor not found with id {0}")]
    NoDoctorWithId(i64),

    #[error("Patient with email id or phone no already exist")]
    PatientExists,

    #[error("Patient not found")]
    PatientNotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub fn doctors(conn: &Connection) -> Result<Vec<Doctor>, DirectoryError> {
    Ok(list_doctors(conn)?)
}

/// Add a doctor. Emails are unique across doctors.
pub fn save_doctor(conn: &mut Connection, form: &DoctorForm) -> Result<i64, DirectoryError> {
    let tx = write_transaction(conn)?;
    if get_doctor_by_email(&tx, &form.email)?.is_some() {
        return Err(DirectoryError::DoctorExists);
    }
    let id = insert_doctor(&tx, form).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => DirectoryError::DoctorExists,
        other => DirectoryError::Database(other),
    })?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(doctor_id = id, "doctor added");
    Ok(id)
}

/// Replace every field of an existing doctor.
pub fn update_doctor(conn: &mut Connection, form: &DoctorForm) -> Result<(), DirectoryError> {
    let id = form.id.ok_or(DirectoryError::DoctorNotFound)?;
    let tx = write_transaction(conn)?;
    let updated = update_doctor_row(&tx, id, form).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => DirectoryError::DoctorExists,
        other => DirectoryError::Database(other),
    })?;
    if !updated {
        return Err(DirectoryError::DoctorNotFound);
    }
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(doctor_id = id, "doctor updated");
    Ok(())
}

/// Remove a doctor together with all of their appointments.
pub fn delete_doctor(conn: &mut Connection, id: i64) -> Result<(), DirectoryError> {
    let tx = write_transaction(conn)?;
    if get_doctor(&tx, id)?.is_none() {
        return Err(DirectoryError::NoDoctorWithId(id));
    }
    let removed = delete_appointments_for_doctor(&tx, id)?;
    delete_doctor_row(&tx, id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(doctor_id = id, appointments_removed = removed, "doctor deleted");
    Ok(())
}

/// Self-signup. Email and phone must both be unused.
pub fn register_patient(conn: &mut Connection, patient: &NewPatient) -> Result<i64, DirectoryError> {
    let tx = write_transaction(conn)?;
    if find_patient_by_email_or_phone(&tx, &patient.email, &patient.phone)?.is_some() {
        return Err(DirectoryError::PatientExists);
    }
    let id = insert_patient(&tx, patient).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => DirectoryError::PatientExists,
        other => DirectoryError::Database(other),
    })?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(patient_id = id, "patient registered");
    Ok(id)
}

pub fn patient_details(conn: &Connection, id: i64) -> Result<Patient, DirectoryError> {
    get_patient(conn, id)?.ok_or(DirectoryError::PatientNotFound)
}

//! Appointment lifecycle: booking, rescheduling, cancellation, the doctor's
//! day view, and prescription recording (which completes an appointment).
//!
//! Every mutation runs in one immediate-mode transaction. The
//! `(doctor_id, appointment_time)` unique index backs up the slot check, so
//! two concurrent bookings of the same start cannot both commit.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use thiserror::Error;

use crate::availability::{available_slots, day_window};
use crate::db::{
    delete_appointment, get_appointment, get_doctor, get_prescription_by_appointment,
    insert_appointment, insert_prescription, list_doctor_day_dtos, set_appointment_status,
    update_appointment, write_transaction, DatabaseError,
};
use crate::models::{
    Appointment, AppointmentDto, AppointmentForm, AppointmentStatus, Prescription,
    PrescriptionForm,
};
use crate::query::normalize_filter;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid doctor id")]
    InvalidDoctor,

    #[error("Appointment slot unavailable")]
    SlotUnavailable,

    #[error("Appointment not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Completed appointment cannot return to scheduled")]
    StatusReverted,

    #[error("Prescription already exists for appointment")]
    DuplicatePrescription,

    #[error("{0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Outcome of checking a requested start against a doctor's free slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCheck {
    InvalidDoctor,
    SlotUnavailable,
    Available,
}

impl SlotCheck {
    pub fn into_result(self) -> Result<(), SchedulingError> {
        match self {
            Self::InvalidDoctor => Err(SchedulingError::InvalidDoctor),
            Self::SlotUnavailable => Err(SchedulingError::SlotUnavailable),
            Self::Available => Ok(()),
        }
    }
}

/// Whether `time` is the start of a free slot of `doctor_id` on that day.
/// Does not check that `time` lies in the future.
pub fn validate_appointment(
    conn: &Connection,
    doctor_id: Option<i64>,
    time: &NaiveDateTime,
) -> Result<SlotCheck, DatabaseError> {
    let Some(doctor_id) = doctor_id else {
        return Ok(SlotCheck::InvalidDoctor);
    };
    if get_doctor(conn, doctor_id)?.is_none() {
        return Ok(SlotCheck::InvalidDoctor);
    }
    let start = time.format("%H:%M").to_string();
    let free = available_slots(conn, doctor_id, time.date())?;
    if free.iter().any(|slot| slot.starts_with(&start)) {
        Ok(SlotCheck::Available)
    } else {
        Ok(SlotCheck::SlotUnavailable)
    }
}

fn slot_conflict(err: DatabaseError) -> SchedulingError {
    match err {
        DatabaseError::ConstraintViolation(detail) => {
            tracing::warn!(%detail, "booking collided on unique slot index");
            SchedulingError::SlotUnavailable
        }
        other => SchedulingError::Database(other),
    }
}

/// Book a new appointment for `patient_id`. Any patient reference in the
/// body is ignored. Returns the new appointment id.
pub fn book(
    conn: &mut Connection,
    patient_id: i64,
    form: &AppointmentForm,
) -> Result<i64, SchedulingError> {
    let time = form
        .appointment_time
        .ok_or(SchedulingError::Invalid("Appointment time is required"))?;
    let doctor_id = form.doctor_ref().ok_or(SchedulingError::InvalidDoctor)?;

    let tx = write_transaction(conn)?;
    validate_appointment(&tx, Some(doctor_id), &time)?.into_result()?;
    let id = insert_appointment(&tx, doctor_id, patient_id, &time, AppointmentStatus::Scheduled)
        .map_err(slot_conflict)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(appointment_id = id, doctor_id, patient_id, "appointment booked");
    Ok(id)
}

/// Reschedule or otherwise modify an appointment owned by `patient_id`.
pub fn update(
    conn: &mut Connection,
    patient_id: i64,
    form: &AppointmentForm,
) -> Result<(), SchedulingError> {
    let id = form.id.ok_or(SchedulingError::NotFound)?;

    let tx = write_transaction(conn)?;
    let existing = get_appointment(&tx, id)?.ok_or(SchedulingError::NotFound)?;
    if let Some(body_patient) = form.patient_ref() {
        if body_patient != existing.patient_id {
            return Err(SchedulingError::Unauthorized);
        }
    }
    if existing.patient_id != patient_id {
        return Err(SchedulingError::Unauthorized);
    }

    let doctor_id = form.doctor_ref().unwrap_or(existing.doctor_id);
    let time = form.appointment_time.unwrap_or(existing.appointment_time);
    let status = form.status.unwrap_or(existing.status);
    if existing.status == AppointmentStatus::Completed && status == AppointmentStatus::Scheduled {
        return Err(SchedulingError::StatusReverted);
    }

    validate_appointment(&tx, Some(doctor_id), &time)?.into_result()?;

    let updated = Appointment {
        id,
        doctor_id,
        patient_id: existing.patient_id,
        appointment_time: time,
        status,
    };
    if !update_appointment(&tx, &updated).map_err(slot_conflict)? {
        return Err(SchedulingError::NotFound);
    }
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(appointment_id = id, doctor_id, "appointment updated");
    Ok(())
}

/// Hard-delete an appointment owned by `patient_id`.
pub fn cancel(
    conn: &mut Connection,
    patient_id: i64,
    appointment_id: i64,
) -> Result<(), SchedulingError> {
    let tx = write_transaction(conn)?;
    let existing = get_appointment(&tx, appointment_id)?.ok_or(SchedulingError::NotFound)?;
    if existing.patient_id != patient_id {
        tracing::warn!(appointment_id, "cancel attempted by another patient");
        return Err(SchedulingError::Unauthorized);
    }
    delete_appointment(&tx, appointment_id)?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(appointment_id, "appointment cancelled");
    Ok(())
}

/// The doctor's appointments on `date`, optionally narrowed by a patient
/// name fragment (`"null"` and blank mean no narrowing).
pub fn list_for_doctor_day(
    conn: &Connection,
    doctor_id: i64,
    date: NaiveDate,
    patient_name: Option<&str>,
) -> Result<Vec<AppointmentDto>, SchedulingError> {
    let (start, end) = day_window(date);
    let name = patient_name.and_then(normalize_filter);
    Ok(list_doctor_day_dtos(conn, doctor_id, &start, &end, name.as_deref())?)
}

/// Record a prescription and mark its appointment completed. The status
/// change happens first; both roll back together on failure.
pub fn record_prescription(
    conn: &mut Connection,
    doctor_id: i64,
    form: &PrescriptionForm,
) -> Result<i64, SchedulingError> {
    let appointment_id = form
        .appointment_id
        .ok_or(SchedulingError::Invalid("Appointment id is required"))?;

    let tx = write_transaction(conn)?;
    let appointment = get_appointment(&tx, appointment_id)?.ok_or(SchedulingError::NotFound)?;
    if appointment.doctor_id != doctor_id {
        return Err(SchedulingError::Unauthorized);
    }
    set_appointment_status(&tx, appointment_id, AppointmentStatus::Completed)?;
    let id = insert_prescription(&tx, appointment_id, form).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => SchedulingError::DuplicatePrescription,
        other => SchedulingError::Database(other),
    })?;
    tx.commit().map_err(DatabaseError::from)?;

    tracing::info!(prescription_id = id, appointment_id, "prescription recorded");
    Ok(id)
}

/// Prescription for an appointment of `doctor_id`, if one was recorded.
pub fn prescription_for_appointment(
    conn: &Connection,
    doctor_id: i64,
    appointment_id: i64,
) -> Result<Option<Prescription>, SchedulingError> {
    let Some(appointment) = get_appointment(conn, appointment_id)? else {
        return Ok(None);
    };
    if appointment.doctor_id != doctor_id {
        return Err(SchedulingError::Unauthorized);
    }
    Ok(get_prescription_by_appointment(conn, appointment_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_doctor, insert_patient, open_database};
    use crate::models::{parse_appointment_time, DoctorForm, EntityRef, NewPatient};
    use tempfile::TempDir;

    struct Clinic {
        _dir: TempDir,
        conn: Connection,
        doctor: i64,
        other_doctor: i64,
        p1: i64,
        p2: i64,
    }

    fn clinic() -> Clinic {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_database(&dir.path().join("clinic.db")).unwrap();
        let doctor = insert_doctor(
            &conn,
            &DoctorForm {
                name: "Alice".into(),
                email: "alice@clinic.test".into(),
                phone: "5550000000".into(),
                password: "secret1".into(),
                specialty: "Cardiology".into(),
                available_times: vec!["09:00-10:00".into(), "10:00-11:00".into()],
                ..Default::default()
            },
        )
        .unwrap();
        let other_doctor = insert_doctor(
            &conn,
            &DoctorForm {
                name: "Bob".into(),
                email: "bob@clinic.test".into(),
                phone: "5550000001".into(),
                password: "secret1".into(),
                specialty: "Cardiology".into(),
                available_times: vec!["14:00-15:00".into()],
                ..Default::default()
            },
        )
        .unwrap();
        let patient = |name: &str, phone: &str| {
            insert_patient(
                &conn,
                &NewPatient {
                    name: name.into(),
                    email: format!("{}@mail.test", name.to_lowercase()),
                    phone: phone.into(),
                    password: "secret1".into(),
                    address: "1 Main St".into(),
                },
            )
            .unwrap()
        };
        let p1 = patient("Patricia", "5551112222");
        let p2 = patient("Sam", "5553334444");
        Clinic { _dir: dir, conn, doctor, other_doctor, p1, p2 }
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_appointment_time(raw).unwrap()
    }

    fn form(doctor: i64, raw: &str) -> AppointmentForm {
        AppointmentForm {
            doctor: Some(EntityRef { id: Some(doctor) }),
            appointment_time: Some(at(raw)),
            ..Default::default()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 10).unwrap()
    }

    #[test]
    fn validate_reports_each_outcome() {
        let c = clinic();
        let t = at("2099-01-10T09:00");
        assert_eq!(validate_appointment(&c.conn, None, &t).unwrap(), SlotCheck::InvalidDoctor);
        assert_eq!(validate_appointment(&c.conn, Some(999), &t).unwrap(), SlotCheck::InvalidDoctor);
        assert_eq!(
            validate_appointment(&c.conn, Some(c.doctor), &at("2099-01-10T12:00")).unwrap(),
            SlotCheck::SlotUnavailable
        );
        assert_eq!(validate_appointment(&c.conn, Some(c.doctor), &t).unwrap(), SlotCheck::Available);
    }

    #[test]
    fn second_booking_of_same_start_is_unavailable() {
        let mut c = clinic();
        book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        let second = book(&mut c.conn, c.p2, &form(c.doctor, "2099-01-10T09:00"));
        assert!(matches!(second, Err(SchedulingError::SlotUnavailable)));
    }

    #[test]
    fn booked_start_leaves_availability() {
        let mut c = clinic();
        let t = at("2099-01-10T10:00");
        book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T10:00")).unwrap();
        let free = available_slots(&c.conn, c.doctor, t.date()).unwrap();
        assert!(free.iter().all(|slot| !slot.starts_with("10:00")));
        assert_eq!(free, vec!["09:00-10:00"]);
    }

    #[test]
    fn concurrent_bookings_commit_once() {
        let c = clinic();
        let path = c.conn.path().unwrap().to_string();
        let doctor = c.doctor;
        let handles: Vec<_> = [c.p1, c.p2]
            .into_iter()
            .map(|patient| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut conn = crate::db::connect(std::path::Path::new(&path)).unwrap();
                    book(&mut conn, patient, &form(doctor, "2099-01-10T09:00"))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(SchedulingError::SlotUnavailable))));
    }

    #[test]
    fn booking_ignores_body_patient() {
        let mut c = clinic();
        let mut body = form(c.doctor, "2099-01-10T09:00");
        body.patient = Some(EntityRef { id: Some(c.p2) });
        let id = book(&mut c.conn, c.p1, &body).unwrap();
        assert_eq!(get_appointment(&c.conn, id).unwrap().unwrap().patient_id, c.p1);
    }

    #[test]
    fn booking_unknown_doctor_is_invalid() {
        let mut c = clinic();
        assert!(matches!(
            book(&mut c.conn, c.p1, &form(999, "2099-01-10T09:00")),
            Err(SchedulingError::InvalidDoctor)
        ));
        assert!(matches!(
            book(&mut c.conn, c.p1, &AppointmentForm::default()),
            Err(SchedulingError::Invalid(_))
        ));
    }

    #[test]
    fn cancel_by_other_patient_is_unauthorized() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();

        assert!(matches!(cancel(&mut c.conn, c.p2, id), Err(SchedulingError::Unauthorized)));
        assert!(get_appointment(&c.conn, id).unwrap().is_some());

        cancel(&mut c.conn, c.p1, id).unwrap();
        assert!(get_appointment(&c.conn, id).unwrap().is_none());
        assert!(matches!(cancel(&mut c.conn, c.p1, id), Err(SchedulingError::NotFound)));
    }

    #[test]
    fn update_moves_to_another_free_slot() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        let mut body = form(c.doctor, "2099-01-10T10:00");
        body.id = Some(id);
        update(&mut c.conn, c.p1, &body).unwrap();

        let stored = get_appointment(&c.conn, id).unwrap().unwrap();
        assert_eq!(stored.start_hhmm(), "10:00");
        assert_eq!(
            available_slots(&c.conn, c.doctor, day()).unwrap(),
            vec!["09:00-10:00"]
        );
    }

    #[test]
    fn update_checks_ownership() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();

        let mut body = form(c.doctor, "2099-01-10T10:00");
        body.id = Some(id);
        body.patient_id = Some(c.p2);
        assert!(matches!(update(&mut c.conn, c.p2, &body), Err(SchedulingError::Unauthorized)));

        body.patient_id = None;
        assert!(matches!(update(&mut c.conn, c.p2, &body), Err(SchedulingError::Unauthorized)));

        body.id = Some(id + 100);
        assert!(matches!(update(&mut c.conn, c.p1, &body), Err(SchedulingError::NotFound)));
    }

    #[test]
    fn update_to_own_start_is_unavailable() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        let mut body = form(c.doctor, "2099-01-10T09:00");
        body.id = Some(id);
        assert!(matches!(
            update(&mut c.conn, c.p1, &body),
            Err(SchedulingError::SlotUnavailable)
        ));
    }

    #[test]
    fn prescription_completes_appointment() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        let rx = PrescriptionForm {
            patient_name: "Patricia".into(),
            appointment_id: Some(id),
            medication: "Ibuprofen".into(),
            dosage: "200mg".into(),
            doctor_notes: Some("after meals".into()),
        };
        record_prescription(&mut c.conn, c.doctor, &rx).unwrap();

        let day_view = list_for_doctor_day(&c.conn, c.doctor, day(), Some("null")).unwrap();
        assert_eq!(day_view.len(), 1);
        assert_eq!(day_view[0].status, AppointmentStatus::Completed);

        let stored = prescription_for_appointment(&c.conn, c.doctor, id).unwrap().unwrap();
        assert_eq!(stored.dosage, "200mg");

        assert!(matches!(
            record_prescription(&mut c.conn, c.doctor, &rx),
            Err(SchedulingError::DuplicatePrescription)
        ));
    }

    #[test]
    fn prescription_rules() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        let mut rx = PrescriptionForm {
            patient_name: "Patricia".into(),
            appointment_id: Some(id),
            medication: "Ibuprofen".into(),
            dosage: "200mg".into(),
            doctor_notes: None,
        };
        assert!(matches!(
            record_prescription(&mut c.conn, c.other_doctor, &rx),
            Err(SchedulingError::Unauthorized)
        ));
        assert_eq!(
            get_appointment(&c.conn, id).unwrap().unwrap().status,
            AppointmentStatus::Scheduled
        );

        rx.appointment_id = Some(id + 100);
        assert!(matches!(
            record_prescription(&mut c.conn, c.doctor, &rx),
            Err(SchedulingError::NotFound)
        ));
        assert!(prescription_for_appointment(&c.conn, c.doctor, id).unwrap().is_none());
    }

    #[test]
    fn completed_appointment_cannot_revert() {
        let mut c = clinic();
        let id = book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        set_appointment_status(&c.conn, id, AppointmentStatus::Completed).unwrap();
        let mut body = form(c.doctor, "2099-01-10T10:00");
        body.id = Some(id);
        body.status = Some(AppointmentStatus::Scheduled);
        assert!(matches!(
            update(&mut c.conn, c.p1, &body),
            Err(SchedulingError::StatusReverted)
        ));
    }

    #[test]
    fn doctor_day_view_is_scoped_and_filtered() {
        let mut c = clinic();
        book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        book(&mut c.conn, c.p2, &form(c.doctor, "2099-01-10T10:00")).unwrap();
        book(&mut c.conn, c.p2, &form(c.other_doctor, "2099-01-10T14:00")).unwrap();

        assert_eq!(list_for_doctor_day(&c.conn, c.doctor, day(), None).unwrap().len(), 2);
        assert_eq!(list_for_doctor_day(&c.conn, c.doctor, day(), Some("  ")).unwrap().len(), 2);
        let sam = list_for_doctor_day(&c.conn, c.doctor, day(), Some("sAm")).unwrap();
        assert_eq!(sam.len(), 1);
        assert_eq!(sam[0].patient_name, "Sam");
        assert_eq!(list_for_doctor_day(&c.conn, c.other_doctor, day(), None).unwrap().len(), 1);
    }

    #[test]
    fn doctor_day_view_matches_non_ascii_patient_name() {
        let mut c = clinic();
        let orjan = insert_patient(
            &c.conn,
            &NewPatient {
                name: "Ørjan Ås".into(),
                email: "orjan@mail.test".into(),
                phone: "5559990000".into(),
                password: "secret1".into(),
                address: "1 Main St".into(),
            },
        )
        .unwrap();
        book(&mut c.conn, orjan, &form(c.doctor, "2099-01-10T09:00")).unwrap();
        book(&mut c.conn, c.p1, &form(c.doctor, "2099-01-10T10:00")).unwrap();

        let found = list_for_doctor_day(&c.conn, c.doctor, day(), Some("ørjan")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].patient_name, "Ørjan Ås");
        assert_eq!(list_for_doctor_day(&c.conn, c.doctor, day(), Some("ÅS")).unwrap().len(), 1);
    }
}

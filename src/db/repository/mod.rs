//! Repository layer: entity-scoped database operations.
//!
//! Every function takes `&Connection`; pass a `&Transaction` to run it
//! inside a caller-owned transaction.

mod admin;
mod appointment;
mod doctor;
mod patient;
mod prescription;

pub use admin::*;
pub use appointment::*;
pub use doctor::*;
pub use patient::*;
pub use prescription::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;
    use chrono::NaiveDateTime;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_appointment_time(raw).unwrap()
    }

    fn doctor_form(name: &str, email: &str, specialty: &str, times: &[&str]) -> DoctorForm {
        DoctorForm {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: "5550000000".into(),
            password: "secret1".into(),
            specialty: specialty.into(),
            available_times: times.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn make_doctor(conn: &Connection, name: &str, specialty: &str, times: &[&str]) -> i64 {
        let email = format!("{}@clinic.test", name.to_lowercase().replace(' ', "."));
        insert_doctor(conn, &doctor_form(name, &email, specialty, times)).unwrap()
    }

    fn make_patient(conn: &Connection, name: &str, phone: &str) -> i64 {
        insert_patient(
            conn,
            &NewPatient {
                name: name.into(),
                email: format!("{}@mail.test", name.to_lowercase()),
                phone: phone.into(),
                password: "secret1".into(),
                address: "1 Main St".into(),
            },
        )
        .unwrap()
    }

    // ═══════════════════════════════════════════
    // Admin
    // ═══════════════════════════════════════════

    #[test]
    fn seed_admin_is_insert_if_absent() {
        let conn = test_db();
        assert!(seed_admin(&conn, "root", "pw").unwrap());
        assert!(!seed_admin(&conn, "root", "other").unwrap());
        let admin = get_admin_by_username(&conn, "root").unwrap().unwrap();
        assert_eq!(admin.password, "pw");
        assert!(get_admin_by_username(&conn, "nobody").unwrap().is_none());
    }

    // ═══════════════════════════════════════════
    // Doctor
    // ═══════════════════════════════════════════

    #[test]
    fn doctor_round_trips_slot_template() {
        let conn = test_db();
        let id = make_doctor(&conn, "Alice", "Cardiology", &["09:00-10:00", "10:00-11:00"]);
        let doctor = get_doctor(&conn, id).unwrap().unwrap();
        assert_eq!(doctor.available_times, vec!["09:00-10:00", "10:00-11:00"]);
        let by_email = get_doctor_by_email(&conn, "alice@clinic.test").unwrap().unwrap();
        assert_eq!(by_email.id, id);
    }

    #[test]
    fn update_doctor_replaces_fields() {
        let conn = test_db();
        let id = make_doctor(&conn, "Alice", "Cardiology", &["09:00-10:00"]);
        let form = doctor_form("Alice Smith", "alice@clinic.test", "Neurology", &["13:00-14:00"]);
        assert!(update_doctor(&conn, id, &form).unwrap());
        let doctor = get_doctor(&conn, id).unwrap().unwrap();
        assert_eq!(doctor.name, "Alice Smith");
        assert_eq!(doctor.specialty, "Neurology");
        assert_eq!(doctor.available_times, vec!["13:00-14:00"]);
        assert!(!update_doctor(&conn, 999, &form).unwrap());
    }

    #[test]
    fn doctor_name_queries_differ_on_case() {
        let conn = test_db();
        make_doctor(&conn, "Alice", "Cardiology", &[]);
        make_doctor(&conn, "Bob", "cardiology", &[]);

        assert_eq!(find_doctors_by_name_like(&conn, "ali").unwrap().len(), 1);
        assert_eq!(find_doctors_by_name_and_specialty(&conn, "BO", "CARDIOLOGY").unwrap().len(), 1);
        assert_eq!(find_doctors_by_specialty(&conn, "Cardiology").unwrap().len(), 2);
        assert_eq!(list_doctors(&conn).unwrap().len(), 2);
    }

    #[test]
    fn delete_doctor_reports_missing() {
        let conn = test_db();
        let id = make_doctor(&conn, "Alice", "Cardiology", &[]);
        assert!(delete_doctor(&conn, id).unwrap());
        assert!(!delete_doctor(&conn, id).unwrap());
    }

    // ═══════════════════════════════════════════
    // Patient
    // ═══════════════════════════════════════════

    #[test]
    fn patient_lookup_by_email_or_phone() {
        let conn = test_db();
        let id = make_patient(&conn, "Pat", "5551112222");
        assert_eq!(get_patient(&conn, id).unwrap().unwrap().name, "Pat");
        assert!(find_patient_by_email_or_phone(&conn, "x@y.z", "5551112222").unwrap().is_some());
        assert!(find_patient_by_email_or_phone(&conn, "pat@mail.test", "0").unwrap().is_some());
        assert!(find_patient_by_email_or_phone(&conn, "x@y.z", "0").unwrap().is_none());
    }

    #[test]
    fn duplicate_patient_phone_rejected() {
        let conn = test_db();
        make_patient(&conn, "Pat", "5551112222");
        let dup = insert_patient(
            &conn,
            &NewPatient {
                name: "Other".into(),
                email: "other@mail.test".into(),
                phone: "5551112222".into(),
                password: "secret1".into(),
                address: "2 Main St".into(),
            },
        );
        assert!(dup.is_err());
    }

    // ═══════════════════════════════════════════
    // Appointment
    // ═══════════════════════════════════════════

    #[test]
    fn double_booking_is_constraint_violation() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &["09:00-10:00"]);
        let p1 = make_patient(&conn, "Pat", "5551112222");
        let p2 = make_patient(&conn, "Sam", "5553334444");
        let t = at("2099-01-10T09:00");

        insert_appointment(&conn, doc, p1, &t, AppointmentStatus::Scheduled).unwrap();
        let second = insert_appointment(&conn, doc, p2, &t, AppointmentStatus::Scheduled);
        assert!(matches!(second, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn day_window_is_half_open() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let pat = make_patient(&conn, "Pat", "5551112222");
        for raw in ["2099-01-09T23:00", "2099-01-10T00:00", "2099-01-10T17:00", "2099-01-11T00:00"] {
            insert_appointment(&conn, doc, pat, &at(raw), AppointmentStatus::Scheduled).unwrap();
        }
        let rows = list_doctor_appointments_between(
            &conn,
            doc,
            &at("2099-01-10T00:00"),
            &at("2099-01-11T00:00"),
        )
        .unwrap();
        let starts: Vec<_> = rows.iter().map(|a| a.start_hhmm()).collect();
        assert_eq!(starts, vec!["00:00", "17:00"]);
    }

    #[test]
    fn status_and_update_persist() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let pat = make_patient(&conn, "Pat", "5551112222");
        let id = insert_appointment(&conn, doc, pat, &at("2099-01-10T09:00"), AppointmentStatus::Scheduled)
            .unwrap();

        assert!(set_appointment_status(&conn, id, AppointmentStatus::Completed).unwrap());
        let mut appt = get_appointment(&conn, id).unwrap().unwrap();
        assert_eq!(appt.status, AppointmentStatus::Completed);

        appt.appointment_time = at("2099-01-10T10:00");
        assert!(update_appointment(&conn, &appt).unwrap());
        assert_eq!(get_appointment(&conn, id).unwrap().unwrap().start_hhmm(), "10:00");
    }

    #[test]
    fn doctor_day_dtos_filter_by_patient_name() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let pat = make_patient(&conn, "Patricia", "5551112222");
        let sam = make_patient(&conn, "Sam", "5553334444");
        insert_appointment(&conn, doc, pat, &at("2099-01-10T09:00"), AppointmentStatus::Scheduled).unwrap();
        insert_appointment(&conn, doc, sam, &at("2099-01-10T10:00"), AppointmentStatus::Scheduled).unwrap();

        let start = at("2099-01-10T00:00");
        let end = at("2099-01-11T00:00");
        assert_eq!(list_doctor_day_dtos(&conn, doc, &start, &end, None).unwrap().len(), 2);
        let only = list_doctor_day_dtos(&conn, doc, &start, &end, Some("TRIC")).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].patient_name, "Patricia");
        assert_eq!(only[0].doctor_name, "Alice");
        assert_eq!(only[0].patient_address, "1 Main St");
    }

    #[test]
    fn patient_dto_queries() {
        let conn = test_db();
        let alice = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let bob = make_doctor(&conn, "Bob", "Cardiology", &[]);
        let pat = make_patient(&conn, "Pat", "5551112222");
        let late = insert_appointment(&conn, alice, pat, &at("2099-03-01T09:00"), AppointmentStatus::Scheduled)
            .unwrap();
        let early = insert_appointment(&conn, alice, pat, &at("2099-01-01T09:00"), AppointmentStatus::Scheduled)
            .unwrap();
        insert_appointment(&conn, bob, pat, &at("2099-02-01T09:00"), AppointmentStatus::Completed).unwrap();

        assert_eq!(list_patient_dtos(&conn, pat).unwrap().len(), 3);

        let scheduled = list_patient_dtos_by_status(&conn, pat, AppointmentStatus::Scheduled).unwrap();
        let ids: Vec<i64> = scheduled.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![early, late]);

        assert_eq!(list_patient_dtos_by_doctor_name(&conn, pat, "BOB").unwrap().len(), 1);
        assert_eq!(
            list_patient_dtos_by_doctor_name_and_status(&conn, pat, "alice", AppointmentStatus::Completed)
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn deleting_patient_cascades_appointments() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let pat = make_patient(&conn, "Pat", "5551112222");
        let id = insert_appointment(&conn, doc, pat, &at("2099-01-10T09:00"), AppointmentStatus::Scheduled)
            .unwrap();
        conn.execute("DELETE FROM patients WHERE id = ?1", [pat]).unwrap();
        assert!(get_appointment(&conn, id).unwrap().is_none());
    }

    #[test]
    fn doctor_with_appointments_cannot_be_deleted_alone() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let pat = make_patient(&conn, "Pat", "5551112222");
        insert_appointment(&conn, doc, pat, &at("2099-01-10T09:00"), AppointmentStatus::Scheduled).unwrap();
        assert!(delete_doctor(&conn, doc).is_err());
        assert_eq!(delete_appointments_for_doctor(&conn, doc).unwrap(), 1);
        assert!(delete_doctor(&conn, doc).unwrap());
    }

    // ═══════════════════════════════════════════
    // Prescription
    // ═══════════════════════════════════════════

    #[test]
    fn second_prescription_for_appointment_rejected() {
        let conn = test_db();
        let doc = make_doctor(&conn, "Alice", "Cardiology", &[]);
        let pat = make_patient(&conn, "Pat", "5551112222");
        let appt = insert_appointment(&conn, doc, pat, &at("2099-01-10T09:00"), AppointmentStatus::Scheduled)
            .unwrap();
        let form = PrescriptionForm {
            patient_name: "Pat".into(),
            appointment_id: Some(appt),
            medication: "Ibuprofen".into(),
            dosage: "200mg".into(),
            doctor_notes: None,
        };
        insert_prescription(&conn, appt, &form).unwrap();
        assert!(matches!(
            insert_prescription(&conn, appt, &form),
            Err(DatabaseError::ConstraintViolation(_))
        ));
        let stored = get_prescription_by_appointment(&conn, appt).unwrap().unwrap();
        assert_eq!(stored.medication, "Ibuprofen");
        assert!(get_prescription_by_appointment(&conn, appt + 1).unwrap().is_none());
    }
}

//! Request-body constraints. Checks run in field declaration order and stop
//! at the first failure, whose message is returned to the client.

use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use crate::availability::is_valid_slot;
use crate::models::{AdminLogin, AppointmentForm, DoctorForm, Login, NewPatient, PrescriptionForm};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn fail(message: &str) -> Result<(), ValidationError> {
    Err(ValidationError(message.to_string()))
}

fn length_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    (min..=max).contains(&len)
}

fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}

fn is_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value.trim())
}

impl Validate for DoctorForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if !length_between(&self.name, 3, 100) {
            return fail("Doctor name must be between 3 and 100 characters");
        }
        if !is_email(&self.email) {
            return fail("Email should be valid");
        }
        if !is_phone(&self.phone) {
            return fail("Phone number must be 10 digits");
        }
        if self.password.chars().count() < 6 {
            return fail("Password must be at least 6 characters");
        }
        if !length_between(&self.specialty, 3, 50) {
            return fail("Specialty must be between 3 and 50 characters");
        }
        if let Some(bad) = self.available_times.iter().find(|slot| !is_valid_slot(slot)) {
            return Err(ValidationError(format!(
                "Available time '{bad}' must look like HH:MM-HH:MM"
            )));
        }
        Ok(())
    }
}

impl Validate for NewPatient {
    fn validate(&self) -> Result<(), ValidationError> {
        if !length_between(&self.name, 3, 100) {
            return fail("Name must be between 3 and 100 characters");
        }
        if !is_email(&self.email) {
            return fail("Email should be valid");
        }
        if !is_phone(&self.phone) {
            return fail("Phone number must be 10 digits");
        }
        if self.password.chars().count() < 6 {
            return fail("Password must be at least 6 characters");
        }
        if self.address.trim().is_empty() {
            return fail("Address cannot be null");
        }
        if self.address.chars().count() > 255 {
            return fail("Address must not exceed 255 characters");
        }
        Ok(())
    }
}

impl Validate for AppointmentForm {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_appointment_at(self, Local::now().naive_local())
    }
}

/// Appointment checks against an explicit clock.
pub fn validate_appointment_at(form: &AppointmentForm, now: NaiveDateTime) -> Result<(), ValidationError> {
    if form.doctor_ref().is_none() {
        return fail("Doctor cannot be null");
    }
    match form.appointment_time {
        None => fail("Appointment time cannot be null"),
        Some(time) if time <= now => fail("Appointment time must be in the future"),
        Some(_) => Ok(()),
    }
}

impl Validate for PrescriptionForm {
    fn validate(&self) -> Result<(), ValidationError> {
        if !length_between(&self.patient_name, 3, 100) {
            return fail("Patient name must be between 3 and 100 characters");
        }
        if self.appointment_id.is_none() {
            return fail("Appointment Id cannot be null");
        }
        if !length_between(&self.medication, 3, 100) {
            return fail("Medication must be between 3 and 100 characters");
        }
        if self.dosage.trim().is_empty() {
            return fail("Dosage cannot be null");
        }
        if self
            .doctor_notes
            .as_deref()
            .is_some_and(|notes| notes.chars().count() > 200)
        {
            return fail("Doctor notes must not exceed 200 characters");
        }
        Ok(())
    }
}

impl Validate for Login {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.identifier.trim().is_empty() {
            return fail("Identifier cannot be empty");
        }
        if self.password.is_empty() {
            return fail("Password cannot be empty");
        }
        Ok(())
    }
}

impl Validate for AdminLogin {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return fail("Username cannot be empty");
        }
        if self.password.is_empty() {
            return fail("Password cannot be empty");
        }
        Ok(())
    }
}

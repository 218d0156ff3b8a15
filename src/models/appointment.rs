use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// Storage and wire format for appointment instants (server local time).
pub const APPOINTMENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Every appointment lasts one hour.
pub const APPOINTMENT_LENGTH_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    #[serde(with = "minute_time")]
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn end_time(&self) -> NaiveDateTime {
        self.appointment_time + Duration::minutes(APPOINTMENT_LENGTH_MINUTES)
    }

    pub fn date(&self) -> NaiveDate {
        self.appointment_time.date()
    }

    /// `HH:MM` of the start instant, the key slots are matched on.
    pub fn start_hhmm(&self) -> String {
        self.appointment_time.format("%H:%M").to_string()
    }
}

/// `{ "id": 3 }` reference to another record inside a request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct EntityRef {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Appointment body for booking and updating. Accepts both the nested
/// `doctor: {id}` / `patient: {id}` shape and flat `doctorId` / `patientId`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub doctor: Option<EntityRef>,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub patient: Option<EntityRef>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default, with = "minute_time::option")]
    pub appointment_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentForm {
    pub fn doctor_ref(&self) -> Option<i64> {
        self.doctor.and_then(|d| d.id).or(self.doctor_id)
    }

    pub fn patient_ref(&self) -> Option<i64> {
        self.patient.and_then(|p| p.id).or(self.patient_id)
    }
}

/// Flat appointment projection shipped to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_address: String,
    #[serde(with = "minute_time")]
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

/// Parse `YYYY-MM-DDTHH:MM[:SS]`, truncated to the minute.
pub fn parse_appointment_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
}

pub fn format_appointment_time(time: &NaiveDateTime) -> String {
    time.format(APPOINTMENT_TIME_FORMAT).to_string()
}

/// Serde adapter for minute-precision appointment instants.
pub mod minute_time {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_appointment_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_appointment_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid appointmentTime: {raw}")))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => super::super::parse_appointment_time(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid appointmentTime: {raw}"))),
            }
        }
    }
}

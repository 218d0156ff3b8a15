//! Free-slot computation over a doctor's recurring daily template.
//!
//! A slot is an `HH:MM-HH:MM` string. A slot is taken on a given date when
//! an appointment for that doctor starts exactly at the slot's start.
//! Overlapping but misaligned bookings do not remove a slot.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use rusqlite::Connection;

use crate::db::{get_doctor, list_doctor_appointments_between, DatabaseError};
use crate::models::Appointment;

static SLOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]-([01][0-9]|2[0-3]):[0-5][0-9]$")
        .unwrap()
});

/// Remove all whitespace from a slot string.
pub fn normalize_slot(slot: &str) -> String {
    slot.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Start of a normalized slot: everything before the first `-`.
pub fn slot_start(slot: &str) -> &str {
    slot.split_once('-').map_or(slot, |(start, _)| start)
}

/// Hour of the slot start, `None` when it does not parse.
pub fn slot_start_hour(slot: &str) -> Option<u32> {
    let start = slot_start(slot);
    let (hour, _) = start.split_once(':')?;
    hour.trim().parse::<u32>().ok().filter(|h| *h < 24)
}

pub fn is_valid_slot(slot: &str) -> bool {
    SLOT_PATTERN.is_match(&normalize_slot(slot))
}

/// `[date 00:00, date+1 00:00)` in server local time.
pub fn day_window(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(chrono::NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Template slots whose start is not taken by `booked`, in template order.
pub fn free_slots(template: &[String], booked: &[Appointment]) -> Vec<String> {
    let taken: HashSet<String> = booked.iter().map(Appointment::start_hhmm).collect();
    template
        .iter()
        .map(|slot| normalize_slot(slot))
        .filter(|slot| !taken.contains(slot_start(slot)))
        .collect()
}

/// Free slots of `doctor_id` on `date`. Unknown doctors have no slots.
pub fn available_slots(
    conn: &Connection,
    doctor_id: i64,
    date: NaiveDate,
) -> Result<Vec<String>, DatabaseError> {
    let Some(doctor) = get_doctor(conn, doctor_id)? else {
        return Ok(Vec::new());
    };
    let (start, end) = day_window(date);
    let booked = list_doctor_appointments_between(conn, doctor_id, &start, &end)?;
    Ok(free_slots(&doctor.available_times, &booked))
}

use super::enums::{AppointmentStatus, TimeOfDay};

/// Doctor directory filter after `"null"`/blank normalisation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DoctorFilter {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub time: Option<String>,
}

impl DoctorFilter {
    /// `None` when the time argument is absent; unrecognised values also
    /// map to `None` and therefore filter nothing.
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        self.time
            .as_deref()
            .and_then(|t| t.trim().to_ascii_lowercase().parse().ok())
    }
}

/// Patient appointment filter after normalisation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub doctor_name: Option<String>,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub specialty: String,
    /// Recurring daily template, `HH:MM-HH:MM` per entry.
    pub available_times: Vec<String>,
}

/// Doctor body for create (`id` absent) and update (`id` required).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorForm {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub available_times: Vec<String>,
}

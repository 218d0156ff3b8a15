use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: i64,
    pub patient_name: String,
    pub appointment_id: i64,
    pub medication: String,
    pub dosage: String,
    pub doctor_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionForm {
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub appointment_id: Option<i64>,
    #[serde(default)]
    pub medication: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub doctor_notes: Option<String>,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub address: String,
}

/// Self-signup body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPatient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: String,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// `POST /admin/login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminLogin {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /doctor/login` and `POST /patient/login` body. The identifier is
/// the account email.
#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

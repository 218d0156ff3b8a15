use std::net::SocketAddr;
use std::path::PathBuf;

use zeroize::Zeroizing;

/// Application-level constants
pub const APP_NAME: &str = "ClinicDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum accepted HMAC secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinicdesk=info,tower_http=warn"
}

/// Get the application data directory
/// ~/ClinicDesk/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Default database file location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address {value}: {reason}")]
    BindAddr { value: String, reason: String },
    #[error("CLINIC_JWT_SECRET must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,
}

/// Admin account seeded at startup when both variables are present.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

/// Process-wide configuration, loaded once at startup.
pub struct AppConfig {
    /// Path prefix every route is mounted under, always starting and ending with `/`.
    pub api_path: String,
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: Zeroizing<Vec<u8>>,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (`std::env::var` in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_path = normalize_api_path(lookup("CLINIC_API_PATH").as_deref().unwrap_or("/"));

        let db_path = lookup("CLINIC_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let raw_addr = lookup("CLINIC_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse::<SocketAddr>().map_err(|e| ConfigError::BindAddr {
            value: raw_addr.clone(),
            reason: e.to_string(),
        })?;

        let jwt_secret = match lookup("CLINIC_JWT_SECRET") {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Zeroizing::new(secret.into_bytes()),
            Some(_) => return Err(ConfigError::SecretTooShort),
            None => {
                tracing::warn!("CLINIC_JWT_SECRET not set, tokens will not survive a restart");
                let bytes: [u8; 32] = rand::random();
                Zeroizing::new(bytes.to_vec())
            }
        };

        let admin_seed = match (lookup("CLINIC_ADMIN_USERNAME"), lookup("CLINIC_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.trim().is_empty() => Some(AdminSeed {
                username: username.trim().to_string(),
                password,
            }),
            _ => None,
        };

        Ok(Self {
            api_path,
            db_path,
            bind_addr,
            jwt_secret,
            admin_seed,
        })
    }
}

/// `api` → `/api/`, `` → `/`.
fn normalize_api_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

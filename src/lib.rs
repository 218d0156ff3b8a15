pub mod api;
pub mod auth;
pub mod availability;
pub mod config;
pub mod db;
pub mod directory;
pub mod models;
pub mod query;
pub mod scheduling;
pub mod validation;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::ApiContext;
use crate::auth::TokenStore;
use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] db::DatabaseError),

    #[error("Server failed: {0}")]
    Server(String),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Migrate the database, seed the admin account and serve until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!("ClinicDesk starting v{}", config::APP_VERSION);

    let conn = db::open_database(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "database ready");

    if let Some(seed) = &config.admin_seed {
        if db::seed_admin(&conn, &seed.username, &seed.password)? {
            tracing::info!(username = %seed.username, "admin account seeded");
        }
    }
    drop(conn);

    let ctx = ApiContext::new(TokenStore::new(config.jwt_secret), config.db_path);
    api::serve_until_ctrl_c(ctx, config.bind_addr, &config.api_path)
        .await
        .map_err(StartupError::Server)
}

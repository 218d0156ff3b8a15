//! Shared state handed to every handler.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::auth::{resolve, resolve_role, Principal, TokenStore};
use crate::db;
use crate::models::Role;

/// Cloned into each request. Holds only immutable, process-wide values.
#[derive(Clone)]
pub struct ApiContext {
    pub tokens: Arc<TokenStore>,
    pub db_path: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(tokens: TokenStore, db_path: PathBuf) -> Self {
        Self {
            tokens: Arc::new(tokens),
            db_path: Arc::new(db_path),
        }
    }

    /// Run `f` on a fresh connection on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let mut conn = db::connect(&path)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }

    /// Resolve `token` as a principal of `role`, then run `f` on the same connection.
    pub async fn with_principal<T, F>(&self, token: String, role: Role, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection, Principal) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let tokens = Arc::clone(&self.tokens);
        self.with_db(move |conn| {
            let principal = resolve_role(conn, &tokens, &token, role)?;
            f(conn, principal)
        })
        .await
    }

    /// Like `with_principal`, for routes where the role arrives as a path literal.
    pub async fn with_claimed_role<T, F>(
        &self,
        token: String,
        role_literal: String,
        f: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection, Principal) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let tokens = Arc::clone(&self.tokens);
        self.with_db(move |conn| {
            let principal = resolve(conn, &tokens, &token, &role_literal)?;
            f(conn, principal)
        })
        .await
    }
}

/// `{"message": "..."}` body used for plain acknowledgements.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Parse a numeric path segment.
pub fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {what}: {raw}")))
}

/// Parse a `YYYY-MM-DD` path segment.
pub fn parse_date(raw: &str) -> Result<chrono::NaiveDate, ApiError> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date: {raw}")))
}

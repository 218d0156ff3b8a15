use rusqlite::Connection;

use super::{AuthError, TokenStore};
use crate::db::{get_admin_by_username, get_doctor_by_email, get_patient_by_email};
use crate::models::Role;

/// An authenticated account, resolved from a token against the live directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Admin { id: i64, username: String },
    Doctor { id: i64, email: String },
    Patient { id: i64, email: String },
}

impl Principal {
    pub fn id(&self) -> i64 {
        match self {
            Self::Admin { id, .. } | Self::Doctor { id, .. } | Self::Patient { id, .. } => *id,
        }
    }

    /// The token subject this principal was resolved from.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Admin { username, .. } => username,
            Self::Doctor { email, .. } | Self::Patient { email, .. } => email,
        }
    }
}

/// Resolve `token` for a role given as a URL literal (`admin`, `doctor`,
/// `patient`, any case). Unknown literals are `RoleMismatch`.
pub fn resolve(
    conn: &Connection,
    tokens: &TokenStore,
    token: &str,
    role_literal: &str,
) -> Result<Principal, AuthError> {
    let role = Role::parse_literal(role_literal)
        .map_err(|_| AuthError::RoleMismatch(role_literal.to_string()))?;
    resolve_role(conn, tokens, token, role)
}

/// Verify `token` and look its subject up among accounts of `role`.
pub fn resolve_role(
    conn: &Connection,
    tokens: &TokenStore,
    token: &str,
    role: Role,
) -> Result<Principal, AuthError> {
    let identifier = tokens.subject(token)?;
    let principal = match role {
        Role::Admin => get_admin_by_username(conn, &identifier)?.map(|a| Principal::Admin {
            id: a.id,
            username: a.username,
        }),
        Role::Doctor => get_doctor_by_email(conn, &identifier)?.map(|d| Principal::Doctor {
            id: d.id,
            email: d.email,
        }),
        Role::Patient => get_patient_by_email(conn, &identifier)?.map(|p| Principal::Patient {
            id: p.id,
            email: p.email,
        }),
    };
    principal.ok_or_else(|| {
        tracing::warn!(role = %role, "token subject has no matching account");
        AuthError::InvalidToken
    })
}

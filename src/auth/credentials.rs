use rusqlite::Connection;
use subtle::ConstantTimeEq;

use super::{AuthError, TokenStore};
use crate::db::{get_admin_by_username, get_doctor_by_email, get_patient_by_email};
use crate::models::Role;

/// Check `password` for the account of `role` named by `identifier` and
/// issue a token for it. Unknown accounts and wrong passwords are
/// indistinguishable to the caller.
pub fn login(
    conn: &Connection,
    tokens: &TokenStore,
    role: Role,
    identifier: &str,
    password: &str,
) -> Result<String, AuthError> {
    let stored = match role {
        Role::Admin => get_admin_by_username(conn, identifier)?.map(|a| a.password),
        Role::Doctor => get_doctor_by_email(conn, identifier)?.map(|d| d.password),
        Role::Patient => get_patient_by_email(conn, identifier)?.map(|p| p.password),
    };

    match stored {
        Some(expected) if passwords_match(&expected, password) => {
            tracing::info!(role = %role, "login succeeded");
            tokens.issue(identifier)
        }
        _ => {
            tracing::warn!(role = %role, "login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn passwords_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}

//! Bearer tokens and principal resolution.
//!
//! Every protected request carries a token in its path. The token's subject
//! is an account identifier (admin username, doctor or patient email); the
//! principal only exists while that account is still in the database.

pub mod credentials;
pub mod principal;
pub mod token;

pub use credentials::login;
pub use principal::{resolve, resolve_role, Principal};
pub use token::{TokenStore, TOKEN_LIFETIME_DAYS};

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Role not accepted here: {0}")]
    RoleMismatch(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

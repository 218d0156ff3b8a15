//! API error type. Every error reaches the client as `{"message": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::db::DatabaseError;
use crate::directory::DirectoryError;
use crate::scheduling::SchedulingError;
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                "Internal server error".to_string()
            }
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => m,
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.0)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ApiError::Unauthorized(err.to_string()),
            AuthError::RoleMismatch(_) => ApiError::Unauthorized("Unauthorized".into()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::Signing(detail) => ApiError::Internal(detail),
            AuthError::Database(e) => e.into(),
        }
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidDoctor
            | SchedulingError::SlotUnavailable
            | SchedulingError::StatusReverted
            | SchedulingError::DuplicatePrescription => ApiError::Conflict(err.to_string()),
            SchedulingError::NotFound => ApiError::NotFound(err.to_string()),
            SchedulingError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            SchedulingError::Invalid(message) => ApiError::BadRequest(message.to_string()),
            SchedulingError::Database(e) => e.into(),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DoctorExists | DirectoryError::PatientExists => {
                ApiError::Conflict(err.to_string())
            }
            DirectoryError::DoctorNotFound
            | DirectoryError::NoDoctorWithId(_)
            | DirectoryError::PatientNotFound => ApiError::NotFound(err.to_string()),
            DirectoryError::Database(e) => e.into(),
        }
    }
}

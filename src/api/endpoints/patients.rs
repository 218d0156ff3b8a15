//! Patient endpoints:
//! - `POST /patient` signup
//! - `POST /patient/login`
//! - `GET /patient/:token` own details
//! - `GET /patient/:id/:user/:token` own appointments
//! - `GET /patient/filter/:condition/:name/:token`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::ValidJson;
use crate::api::types::{parse_id, ApiContext, MessageResponse, TokenResponse};
use crate::auth::{self, Principal};
use crate::directory;
use crate::models::{AppointmentDto, Login, NewPatient, Patient, Role};
use crate::query;

#[derive(Serialize)]
pub struct PatientResponse {
    pub patient: Patient,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentDto>,
}

pub async fn signup(
    State(ctx): State<ApiContext>,
    ValidJson(body): ValidJson<NewPatient>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    ctx.with_db(move |conn| Ok(directory::register_patient(conn, &body)?))
        .await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Signup successful"))))
}

pub async fn login(
    State(ctx): State<ApiContext>,
    ValidJson(body): ValidJson<Login>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = ctx.tokens.clone();
    let token = ctx
        .with_db(move |conn| {
            Ok(auth::login(conn, &tokens, Role::Patient, &body.identifier, &body.password)?)
        })
        .await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn details(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = ctx
        .with_principal(token, Role::Patient, |conn, patient| {
            Ok(directory::patient_details(conn, patient.id())?)
        })
        .await?;
    Ok(Json(PatientResponse { patient }))
}

pub async fn appointments(
    State(ctx): State<ApiContext>,
    Path((id, user, token)): Path<(String, String, String)>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let id = parse_id(&id, "patient id")?;
    let appointments = ctx
        .with_claimed_role(token, user, move |conn, principal| match principal {
            Principal::Patient { id: own, .. } if own == id => {
                Ok(query::filter_patient_appointments(conn, own, &Default::default())?)
            }
            _ => Err(ApiError::Unauthorized("Unauthorized".into())),
        })
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

pub async fn filter(
    State(ctx): State<ApiContext>,
    Path((condition, name, token)): Path<(String, String, String)>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let filter = query::appointment_filter(&condition, &name);
    let appointments = ctx
        .with_principal(token, Role::Patient, move |conn, patient| {
            Ok(query::filter_patient_appointments(conn, patient.id(), &filter)?)
        })
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

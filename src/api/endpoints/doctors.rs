//! Doctor directory endpoints. Listing, filtering and login are public;
//! changes require an admin token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::ValidJson;
use crate::api::types::{parse_date, parse_id, ApiContext, MessageResponse, TokenResponse};
use crate::auth;
use crate::availability;
use crate::directory;
use crate::models::{Doctor, DoctorForm, Login, Role};
use crate::query;

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<Doctor>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub availability: Vec<String>,
}

/// `GET /doctor`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DoctorsResponse>, ApiError> {
    let doctors = ctx.with_db(|conn| Ok(directory::doctors(conn)?)).await?;
    Ok(Json(DoctorsResponse { doctors }))
}

/// `POST /doctor/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    ValidJson(body): ValidJson<Login>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = ctx.tokens.clone();
    let token = ctx
        .with_db(move |conn| {
            Ok(auth::login(conn, &tokens, Role::Doctor, &body.identifier, &body.password)?)
        })
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// `POST /doctor/:token`
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<DoctorForm>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    ctx.with_principal(token, Role::Admin, move |conn, _admin| {
        Ok(directory::save_doctor(conn, &body)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Doctor added to db"))))
}

/// `PUT /doctor/:token`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<DoctorForm>,
) -> Result<Json<MessageResponse>, ApiError> {
    ctx.with_principal(token, Role::Admin, move |conn, _admin| {
        Ok(directory::update_doctor(conn, &body)?)
    })
    .await?;
    Ok(Json(MessageResponse::new("Doctor updated")))
}

/// `DELETE /doctor/:id/:token`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path((id, token)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "doctor id")?;
    ctx.with_principal(token, Role::Admin, move |conn, _admin| {
        Ok(directory::delete_doctor(conn, id)?)
    })
    .await?;
    Ok(Json(MessageResponse::new("Doctor deleted successfully")))
}

/// `GET /doctor/availability/:user/:doctor_id/:date/:token`
pub async fn availability(
    State(ctx): State<ApiContext>,
    Path((user, doctor_id, date, token)): Path<(String, String, String, String)>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let doctor_id = parse_id(&doctor_id, "doctor id")?;
    let date = parse_date(&date)?;
    let availability = ctx
        .with_claimed_role(token, user, move |conn, _principal| {
            Ok(availability::available_slots(conn, doctor_id, date)?)
        })
        .await?;
    Ok(Json(AvailabilityResponse { availability }))
}

/// `GET /doctor/filter/:name/:time/:speciality`
pub async fn filter(
    State(ctx): State<ApiContext>,
    Path((name, time, specialty)): Path<(String, String, String)>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    let filter = query::doctor_filter(&name, &time, &specialty);
    let doctors = ctx
        .with_db(move |conn| Ok(query::filter_doctors(conn, &filter)?))
        .await?;
    Ok(Json(DoctorsResponse { doctors }))
}

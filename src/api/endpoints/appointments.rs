//! Appointment endpoints. Booking, rescheduling and cancelling take a
//! patient token; the day view takes a doctor token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::ValidJson;
use crate::api::types::{parse_date, parse_id, ApiContext, MessageResponse};
use crate::models::{AppointmentDto, AppointmentForm, Role};
use crate::scheduling;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentDto>,
}

/// `POST /appointments/:token`
pub async fn book(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<AppointmentForm>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    ctx.with_principal(token, Role::Patient, move |conn, patient| {
        Ok(scheduling::book(conn, patient.id(), &body)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Appointment booked"))))
}

/// `PUT /appointments/:token`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<AppointmentForm>,
) -> Result<Json<MessageResponse>, ApiError> {
    ctx.with_principal(token, Role::Patient, move |conn, patient| {
        Ok(scheduling::update(conn, patient.id(), &body)?)
    })
    .await?;
    Ok(Json(MessageResponse::new("Appointment updated")))
}

/// `DELETE /appointments/:id/:token`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path((id, token)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, "appointment id")?;
    ctx.with_principal(token, Role::Patient, move |conn, patient| {
        Ok(scheduling::cancel(conn, patient.id(), id)?)
    })
    .await?;
    Ok(Json(MessageResponse::new("Appointment cancelled")))
}

/// `GET /appointments/:date/:patient_name/:token`
pub async fn doctor_day(
    State(ctx): State<ApiContext>,
    Path((date, patient_name, token)): Path<(String, String, String)>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let date = parse_date(&date)?;
    let appointments = ctx
        .with_principal(token, Role::Doctor, move |conn, doctor| {
            Ok(scheduling::list_for_doctor_day(
                conn,
                doctor.id(),
                date,
                Some(patient_name.as_str()),
            )?)
        })
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

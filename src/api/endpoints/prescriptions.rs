use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::ValidJson;
use crate::api::types::{parse_id, ApiContext, MessageResponse};
use crate::models::{Prescription, PrescriptionForm, Role};
use crate::scheduling;

#[derive(Serialize)]
pub struct PrescriptionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub prescription: Option<Prescription>,
}

/// `POST /prescription/:token`. Also marks the appointment completed.
pub async fn save(
    State(ctx): State<ApiContext>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<PrescriptionForm>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    ctx.with_principal(token, Role::Doctor, move |conn, doctor| {
        Ok(scheduling::record_prescription(conn, doctor.id(), &body)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Prescription saved"))))
}

/// `GET /prescription/:appointment_id/:token`
pub async fn for_appointment(
    State(ctx): State<ApiContext>,
    Path((appointment_id, token)): Path<(String, String)>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    let appointment_id = parse_id(&appointment_id, "appointment id")?;
    let prescription = ctx
        .with_principal(token, Role::Doctor, move |conn, doctor| {
            Ok(scheduling::prescription_for_appointment(conn, doctor.id(), appointment_id)?)
        })
        .await?;
    let message = prescription
        .is_none()
        .then_some("No prescription found for appointment");
    Ok(Json(PrescriptionResponse {
        message,
        prescription,
    }))
}

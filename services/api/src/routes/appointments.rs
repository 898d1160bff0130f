use actix_web::{get, post, web, HttpResponse};
use common::{doctor_message_for, transition_allowed, AppError, AppointmentStatus, Role};
use db::NewAppointment;
use serde_json::json;
use uuid::Uuid;

use crate::error::HttpApiError;
use crate::extractors::{require_role, AuthUser};
use crate::schemas::{BookAppointmentInput, StatusUpdateInput};
use crate::state::AppState;

#[post("/appointments")]
pub async fn create(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<BookAppointmentInput>,
) -> Result<HttpResponse, HttpApiError> {
    require_role(&user, Role::Patient, "Only patients can book appointments")?;
    let payload = payload.into_inner();
    payload.validate().map_err(HttpApiError::from)?;

    let doctor = db::find_user_by_id(&state.db, payload.doctor_id)
        .await?
        .filter(|u| u.role == Role::Doctor.as_str())
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let created = db::book_appointment(
        &state.db,
        NewAppointment {
            patient_id: user.user_id,
            doctor_id: doctor.id,
            date: payload.date.trim(),
            time: payload.time.trim(),
            reason: payload.reason.as_deref().unwrap_or(""),
            patient_notes: payload.patient_notes.as_deref().unwrap_or(""),
            symptoms: payload.symptoms.as_deref().unwrap_or(""),
        },
        state.slot_blocking,
    )
    .await?
    .ok_or_else(|| AppError::Conflict("Slot already taken".to_string()))?;

    tracing::info!(
        appointment_id = %created.id,
        doctor_id = %created.doctor_id,
        "appointment requested"
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Appointment requested successfully",
        "appointment": created
    })))
}

/// Caller's appointments, earliest slot first, each joined with the other
/// party's public profile fields.
#[get("/appointments")]
pub async fn list(
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HttpApiError> {
    let appts = match user.role {
        Role::Patient => db::appointments_for_patient(&state.db, user.user_id).await?,
        Role::Doctor => db::appointments_for_doctor(&state.db, user.user_id).await?,
    };
    Ok(HttpResponse::Ok().json(json!({ "appointments": appts })))
}

#[post("/appointments/{id}/status")]
pub async fn update_status(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<StatusUpdateInput>,
) -> Result<HttpResponse, HttpApiError> {
    require_role(&user, Role::Doctor, "Only doctors can update status")?;
    let id = path.into_inner();
    let payload = payload.into_inner();

    let appt = db::get_appointment(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if appt.doctor_id != user.user_id {
        return Err(AppError::Forbidden("Not allowed".to_string()).into());
    }

    let new_status = AppointmentStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;
    let current = AppointmentStatus::parse(&appt.status).unwrap_or(AppointmentStatus::Pending);
    if !transition_allowed(current, new_status) {
        return Err(AppError::BadRequest("Invalid status".to_string()).into());
    }

    let message = doctor_message_for(new_status, payload.doctor_message.as_deref());
    let updated = db::set_appointment_status(&state.db, id, new_status, &message)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Appointment status updated",
        "appointment": updated
    })))
}

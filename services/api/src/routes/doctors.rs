use actix_web::{get, web, HttpResponse};
use common::{AppError, Role};
use db::DoctorFilter;
use serde_json::json;
use uuid::Uuid;

use crate::error::HttpApiError;
use crate::extractors::{require_role, AuthUser};
use crate::schemas::DoctorQuery;
use crate::state::AppState;

/// Doctor directory. Every present query param narrows the result set;
/// with none given this lists all doctors.
#[get("/doctors")]
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<DoctorQuery>,
) -> Result<HttpResponse, HttpApiError> {
    let q = query.into_inner();
    let filter = DoctorFilter {
        name: q.name.filter(|s| !s.is_empty()),
        specialization: q.spec.filter(|s| !s.is_empty()),
        symptoms: q.symptoms.filter(|s| !s.is_empty()),
        availability: q.availability.filter(|s| !s.is_empty()),
        time_slot: q.time.filter(|s| !s.is_empty()),
    };
    let doctors = db::find_doctors(&state.db, &filter).await?;
    Ok(HttpResponse::Ok().json(json!({ "doctors": doctors })))
}

#[get("/doctors/{id}")]
pub async fn get_doctor(
    _user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpApiError> {
    let doctor = db::find_user_by_id(&state.db, path.into_inner())
        .await?
        .filter(|u| u.role == Role::Doctor.as_str())
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "doctor": doctor })))
}

#[get("/patients/{id}")]
pub async fn get_patient(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpApiError> {
    require_role(&user, Role::Doctor, "Only doctors can view patient details")?;
    let patient = db::find_user_by_id(&state.db, path.into_inner())
        .await?
        .filter(|u| u.role == Role::Patient.as_str())
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "patient": patient })))
}

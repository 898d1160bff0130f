use actix_web::{get, post, web, HttpResponse};
use common::{AppError, Role};
use serde_json::json;

use crate::error::HttpApiError;
use crate::extractors::AuthUser;
use crate::schemas::ProfileUpdateInput;
use crate::state::AppState;

#[get("/profile")]
pub async fn get_profile(
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HttpApiError> {
    let row = db::find_user_by_id(&state.db, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "user": row })))
}

#[post("/profile/update")]
pub async fn update_profile(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ProfileUpdateInput>,
) -> Result<HttpResponse, HttpApiError> {
    let payload = payload.into_inner();

    let current = db::find_user_by_id(&state.db, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Specialization is a doctor-only attribute.
    let specialization = if user.role == Role::Doctor {
        payload.specialization.as_deref()
    } else {
        None
    };

    if payload.wants_password_change() {
        let old = payload
            .old_password
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Old password is required".to_string()))?;
        if !auth::verify_password(old, &current.password_hash) {
            return Err(AppError::BadRequest("Old password is incorrect".to_string()).into());
        }
        let (new, confirm) = match (
            payload.new_password.as_deref(),
            payload.confirm_password.as_deref(),
        ) {
            (Some(n), Some(c)) => (n, c),
            _ => {
                return Err(AppError::BadRequest(
                    "New & confirm password are required".to_string(),
                )
                .into())
            }
        };
        if new != confirm {
            return Err(AppError::BadRequest("Passwords do not match".to_string()).into());
        }
        let hash = auth::hash_password(new).map_err(|_| AppError::Internal)?;
        db::set_user_password(&state.db, user.user_id, &hash).await?;
    }

    db::update_user_profile(
        &state.db,
        user.user_id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.phone.as_deref(),
        specialization,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "success": true
    })))
}

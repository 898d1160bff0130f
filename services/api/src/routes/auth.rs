use actix_web::{get, post, web, HttpRequest, HttpResponse};
use auth::sha256_hex;
use chrono::{Duration, Utc};
use common::AppError;
use db::{find_user_by_email, find_user_by_id, insert_refresh, revoke_refresh, NewUser, UserRow};
use serde_json::json;
use uuid::Uuid;

use crate::error::HttpApiError;
use crate::extractors::AuthUser;
use crate::schemas::{LoginInput, RegisterInput};
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

struct SessionTokens {
    access: String,
    refresh: String,
}

/// Issue an access/refresh pair and persist the refresh fingerprint for
/// later rotation checks.
async fn open_session(
    state: &AppState,
    user_id: Uuid,
    role: &str,
) -> Result<SessionTokens, HttpApiError> {
    let (access, _) =
        auth::issue(&state.keys, user_id, role, state.access_ttl).map_err(|_| HttpApiError::Auth)?;
    let (refresh_token, claims) = auth::issue(&state.keys, user_id, role, state.refresh_ttl)
        .map_err(|_| HttpApiError::Auth)?;

    let token_hash = format!("sha256:{}", sha256_hex(&refresh_token));
    let expires_at = Utc::now() + Duration::seconds(state.refresh_ttl);
    insert_refresh(&state.db, user_id, &claims.jti, &token_hash, expires_at).await?;

    Ok(SessionTokens {
        access,
        refresh: refresh_token,
    })
}

fn session_cookie<'a>(
    state: &AppState,
    name: &'a str,
    value: String,
) -> actix_web::cookie::Cookie<'a> {
    actix_web::cookie::Cookie::build(name, value)
        .domain(state.cookie_domain.clone())
        .secure(state.cookie_secure)
        .http_only(true)
        .path("/")
        .finish()
}

fn session_response(
    state: &AppState,
    user: &UserRow,
    tokens: SessionTokens,
    message: &str,
) -> HttpResponse {
    let access_cookie = session_cookie(state, ACCESS_COOKIE, tokens.access.clone());
    let refresh_cookie = session_cookie(state, REFRESH_COOKIE, tokens.refresh.clone());
    let mut resp = HttpResponse::Ok().json(json!({
        "message": message,
        "user": user,
        "tokens": { "access": tokens.access, "refresh": tokens.refresh }
    }));
    let _ = resp.add_cookie(&access_cookie);
    let _ = resp.add_cookie(&refresh_cookie);
    resp
}

#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterInput>,
) -> Result<HttpResponse, HttpApiError> {
    let payload = payload.into_inner();
    let role = payload.validate().map_err(HttpApiError::from)?;

    if find_user_by_email(&state.db, &payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already used".into()).into());
    }

    let hash = auth::hash_password(&payload.password).map_err(|_| AppError::Internal)?;
    // The unique constraint catches a registration that races past the
    // lookup above.
    let user = db::insert_user(
        &state.db,
        NewUser {
            email: &payload.email,
            password_hash: &hash,
            name: &payload.name,
            role: role.as_str(),
            phone: payload.phone.as_deref(),
            specialization: payload.specialization.as_deref(),
            symptoms: payload.symptoms.as_deref(),
            age: payload.age,
            gender: payload.gender.as_deref(),
            available_days: payload.available_days.as_deref(),
            available_slots: payload.available_slots.as_deref(),
        },
    )
    .await?
    .ok_or_else(|| AppError::Conflict("Email already used".to_string()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "registered");

    let tokens = open_session(&state, user.id, &user.role).await?;
    Ok(session_response(&state, &user, tokens, "Registered successfully"))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginInput>,
) -> Result<HttpResponse, HttpApiError> {
    let payload = payload.into_inner();
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("Missing fields".into()).into());
    }

    let user = find_user_by_email(&state.db, &payload.email).await?;
    let user = match user {
        Some(u) if auth::verify_password(&payload.password, &u.password_hash) => u,
        _ => return Err(AppError::Unauthorized.into()),
    };

    let tokens = open_session(&state, user.id, &user.role).await?;
    Ok(session_response(&state, &user, tokens, "Logged in successfully"))
}

#[post("/auth/refresh")]
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HttpApiError> {
    let cookie = req.cookie(REFRESH_COOKIE).ok_or(HttpApiError::Auth)?;
    let token = cookie.value().to_string();
    let claims = auth::resolve(&state.keys, &token).map_err(|_| HttpApiError::Auth)?;

    match db::get_refresh_by_jti(&state.db, &claims.jti).await? {
        Some(row) => {
            let given_hash = format!("sha256:{}", sha256_hex(&token));
            if row.revoked || given_hash != row.token_hash {
                return Err(HttpApiError::Auth);
            }
        }
        None => return Err(HttpApiError::Auth),
    }

    // Single-use: the presented token is revoked before its replacement is issued.
    revoke_refresh(&state.db, &claims.jti).await?;
    let tokens = open_session(&state, claims.sub, &claims.role).await?;

    let access_cookie = session_cookie(&state, ACCESS_COOKIE, tokens.access.clone());
    let refresh_cookie = session_cookie(&state, REFRESH_COOKIE, tokens.refresh.clone());
    let mut resp = HttpResponse::Ok().json(json!({ "access_token": tokens.access }));
    let _ = resp.add_cookie(&access_cookie);
    let _ = resp.add_cookie(&refresh_cookie);
    Ok(resp)
}

#[post("/auth/logout")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HttpApiError> {
    if let Some(c) = req.cookie(REFRESH_COOKIE) {
        if let Ok(claims) = auth::resolve(&state.keys, c.value()) {
            revoke_refresh(&state.db, &claims.jti).await?;
        }
    }
    let clear = |name: &'static str| {
        actix_web::cookie::Cookie::build(name, "")
            .path("/")
            .domain(state.cookie_domain.clone())
            .secure(state.cookie_secure)
            .http_only(true)
            .max_age(actix_web::cookie::time::Duration::seconds(0))
            .finish()
    };
    let mut resp = HttpResponse::Ok().json(json!({ "message": "Logged out" }));
    let _ = resp.add_cookie(&clear(ACCESS_COOKIE));
    let _ = resp.add_cookie(&clear(REFRESH_COOKIE));
    Ok(resp)
}

#[get("/auth/me")]
pub async fn me(
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HttpApiError> {
    let row = find_user_by_id(&state.db, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({ "user": row })))
}

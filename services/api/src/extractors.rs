use actix_web::{web, FromRequest, HttpMessage};
use common::{AppError, Role};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::HttpApiError;
use crate::state::AppState;

/// The authenticated caller, resolved from a Bearer header or the
/// `access_token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

fn resolve_from_request(req: &actix_web::HttpRequest) -> Option<AuthUser> {
    let state = req.app_data::<web::Data<AppState>>()?;
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string());
    let token = bearer.or_else(|| req.cookie("access_token").map(|c| c.value().to_string()))?;
    let claims = auth::resolve(&state.keys, &token).ok()?;
    let role = Role::parse(&claims.role)?;
    Some(AuthUser {
        user_id: claims.sub,
        role,
    })
}

impl FromRequest for AuthUser {
    type Error = HttpApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }
        match resolve_from_request(req) {
            Some(user) => {
                req.extensions_mut().insert(user.clone());
                ready(Ok(user))
            }
            None => ready(Err(HttpApiError::App(AppError::Unauthorized))),
        }
    }
}

pub fn require_role(user: &AuthUser, role: Role, denial: &str) -> Result<(), HttpApiError> {
    if user.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(denial.to_string()).into())
    }
}

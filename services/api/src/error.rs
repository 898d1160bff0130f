use actix_web::{HttpResponse, ResponseError};
use common::AppError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpApiError {
    #[error("{0}")]
    App(#[from] AppError),
    #[error("db error")]
    Db(#[from] db::DbError),
    #[error("auth error")]
    Auth,
}

impl ResponseError for HttpApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::App(AppError::NotFound(msg)) => {
                HttpResponse::NotFound().json(json!({ "message": msg }))
            }
            // The observed contract reports a taken slot as 400, not 409.
            Self::App(AppError::Conflict(msg)) => {
                HttpResponse::BadRequest().json(json!({ "message": msg }))
            }
            Self::App(AppError::BadRequest(msg)) => {
                HttpResponse::BadRequest().json(json!({ "message": msg }))
            }
            Self::App(AppError::Forbidden(msg)) => {
                HttpResponse::Forbidden().json(json!({ "message": msg }))
            }
            Self::App(AppError::Unauthorized) | Self::Auth => {
                HttpResponse::Unauthorized().json(json!({ "message": "Not authenticated" }))
            }
            Self::Db(e) => {
                tracing::error!(error = %e, "store failure");
                HttpResponse::InternalServerError().json(json!({ "message": "Server error" }))
            }
            Self::App(AppError::Internal) => {
                HttpResponse::InternalServerError().json(json!({ "message": "Server error" }))
            }
        }
    }
}

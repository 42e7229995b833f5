use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::gatekeeper::AuthenticationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no app token pairing for user")]
    PairingNotFound,

    #[error("auth token could not be issued: {0}")]
    IssueFailed(#[source] AuthenticationError),

    #[error("auth token could not be removed: {0}")]
    AuthTokenNotFound(#[source] AuthenticationError),

    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::PairingNotFound => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "apptoken_not_found",
                "no matching app token for user".to_string(),
            ),
            AppError::AuthTokenNotFound(e) => {
                tracing::debug!("Gatekeeper refused removal: {}", e);
                (
                    StatusCode::NOT_FOUND,
                    "not_found_error",
                    "authtoken_not_found",
                    "auth token not found".to_string(),
                )
            }
            AppError::IssueFailed(e) => {
                tracing::error!("Gatekeeper refused to issue auth token: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "authtoken_not_issued",
                    "auth token could not be issued".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

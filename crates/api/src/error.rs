use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use waitlist_core::validation::FieldError;
use waitlist_store::ServiceError;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const DUPLICATE_MESSAGE: &str = "This email is already subscribed to our newsletter.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input")]
    InvalidInput(Vec<FieldError>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("duplicate subscription")]
    Duplicate,
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl AppError {
    /// Maps a service failure; store faults become `Internal` carrying the
    /// endpoint's generic message and are logged here.
    pub fn service(err: ServiceError, internal_message: &'static str) -> Self {
        match err {
            ServiceError::InvalidInput(errors) => AppError::InvalidInput(errors),
            ServiceError::Duplicate(_) => AppError::Duplicate,
            ServiceError::Store(err) => {
                error!(error = %err, "{}", internal_message);
                AppError::Internal(internal_message)
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, errors) = match self {
            AppError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                INVALID_EMAIL_MESSAGE.to_string(),
                Some(errors),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Duplicate => (StatusCode::CONFLICT, DUPLICATE_MESSAGE.to_string(), None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string(), None),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string(), None),
        };

        (status, Json(ErrorResponse { message, errors })).into_response()
    }
}

pub type ApiResult<T> = Result<T, AppError>;

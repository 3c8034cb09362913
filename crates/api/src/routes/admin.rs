use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{ApiResult, AppError},
    state::{AdminToken, AppState},
};
use waitlist_core::auth::IssuedSession;
use waitlist_core::export::CSV_FILENAME;
use waitlist_core::types::Subscription;

pub const INVALID_LOGIN: &str = "Invalid username or password";

/// Routes reachable without a session.
pub fn session_router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/login", post(login))
        .with_state(state)
}

/// Routes that sit behind `admin_session_auth`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/subscribers", get(list_subscribers))
        .route("/api/admin/subscribers/export", get(export_subscribers))
        .route("/api/admin/subscribers/emails", get(email_list))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LogoutResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct SubscriberListResponse {
    subscribers: Vec<Subscription>,
}

#[derive(Debug, Serialize)]
struct EmailListResponse {
    emails: String,
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<IssuedSession>> {
    let Json(payload) = payload?;

    match state
        .gate
        .login(&payload.username, &payload.password, Utc::now())
        .await
    {
        Some(session) => {
            info!(expires_at = %session.expires_at, "admin: login succeeded");
            Ok(Json(session))
        }
        None => {
            warn!("admin: login rejected");
            Err(AppError::Unauthorized(INVALID_LOGIN))
        }
    }
}

async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<AdminToken>,
) -> Json<LogoutResponse> {
    state.gate.logout(&token.0).await;
    info!("admin: logged out");
    Json(LogoutResponse {
        message: "Logged out",
    })
}

async fn list_subscribers(
    State(state): State<AppState>,
) -> ApiResult<Json<SubscriberListResponse>> {
    let subscribers = state
        .service
        .list_all()
        .await
        .map_err(|err| AppError::service(err, "Unable to get subscribers"))?;

    Ok(Json(SubscriberListResponse { subscribers }))
}

async fn export_subscribers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let csv = state
        .service
        .export_csv()
        .await
        .map_err(|err| AppError::service(err, "Unable to export subscribers"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILENAME),
            ),
        ],
        csv,
    ))
}

async fn email_list(State(state): State<AppState>) -> ApiResult<Json<EmailListResponse>> {
    let emails = state
        .service
        .email_list()
        .await
        .map_err(|err| AppError::service(err, "Unable to get subscribers"))?;

    Ok(Json(EmailListResponse { emails }))
}

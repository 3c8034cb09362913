use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::warn;

use crate::{
    error::{ApiResult, AppError},
    state::{AdminToken, AppState},
};

pub const SESSION_REQUIRED: &str = "Admin session required";

pub async fn admin_session_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized(SESSION_REQUIRED))?;

    let token = parse_bearer(header_value)?.to_string();

    if !state.gate.is_session_valid(&token, Utc::now()).await {
        warn!(path = %req.uri().path(), "admin: rejected invalid or expired session");
        return Err(AppError::Unauthorized(SESSION_REQUIRED));
    }

    req.extensions_mut().insert(AdminToken(token));

    Ok(next.run(req).await)
}

fn parse_bearer(value: &HeaderValue) -> ApiResult<&str> {
    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized(SESSION_REQUIRED))?;
    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if scheme != "Bearer" || token.is_empty() {
        return Err(AppError::Unauthorized(SESSION_REQUIRED));
    }
    Ok(token)
}

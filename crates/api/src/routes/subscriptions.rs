use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiResult, AppError},
    state::AppState,
};
use waitlist_core::types::SubscriptionSummary;
use waitlist_core::validation::FieldError;

pub const SUBSCRIBED_MESSAGE: &str = "Successfully subscribed! You'll be notified when we launch.";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/subscribe", post(subscribe))
        .route("/api/subscribers/count", get(count))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    #[serde(default)]
    email: Option<serde_json::Value>,
}

impl SubscribeRequest {
    /// A present but non-string `email` is a field error, not a malformed body.
    fn email(&self) -> Result<Option<&str>, AppError> {
        match &self.email {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(email)) => Ok(Some(email.as_str())),
            Some(_) => Err(AppError::InvalidInput(vec![FieldError::email(
                "Expected string",
            )])),
        }
    }
}

#[derive(Debug, Serialize)]
struct SubscribeResponse {
    message: &'static str,
    subscription: SubscriptionSummary,
}

#[derive(Debug, Serialize)]
struct CountResponse {
    count: usize,
}

async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubscribeResponse>)> {
    let Json(payload) = payload?;
    let email = payload.email()?;

    let subscription = state
        .service
        .subscribe(email)
        .await
        .map_err(|err| {
            AppError::service(err, "An error occurred while subscribing. Please try again.")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            message: SUBSCRIBED_MESSAGE,
            subscription,
        }),
    ))
}

async fn count(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    let count = state
        .service
        .count()
        .await
        .map_err(|err| AppError::service(err, "Unable to get subscriber count"))?;

    Ok(Json(CountResponse { count }))
}

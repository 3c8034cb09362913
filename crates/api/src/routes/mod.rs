pub mod admin;
pub mod health;
pub mod subscriptions;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};

use crate::middleware::{
    auth::admin_session_auth, request_id::request_id, request_log::request_log,
};
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    let admin = admin::router(state.clone())
        .route_layer(from_fn_with_state(state.clone(), admin_session_auth));

    Router::new()
        .merge(subscriptions::router(state.clone()))
        .merge(admin::session_router(state))
        .merge(admin)
}

pub fn health_router(state: AppState) -> Router {
    health::router(state)
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health_router(state.clone()))
        .merge(api_router(state))
        .layer(from_fn(request_log))
        .layer(from_fn(request_id))
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Request, StatusCode},
        Router,
    };
    use chrono::Duration;
    use secrecy::SecretString;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::state::AppState;
    use waitlist_core::auth::{AdminCredentials, AdminGate};
    use waitlist_store::{MemoryStore, SubscriptionService};

    pub const ADMIN_USERNAME: &str = "admin";
    pub const ADMIN_PASSWORD: &str = "correct horse";

    fn credentials() -> AdminCredentials {
        AdminCredentials::new(ADMIN_USERNAME, SecretString::from(ADMIN_PASSWORD.to_string()))
    }

    pub struct TestApp {
        pub state: AppState,
    }

    impl TestApp {
        pub fn new() -> Self {
            Self {
                state: AppState {
                    service: SubscriptionService::new(Arc::new(MemoryStore::new())),
                    gate: Arc::new(AdminGate::new(credentials(), Duration::hours(24))),
                    waitlist_env: "test".to_string(),
                },
            }
        }

        pub fn router(&self) -> Router {
            super::app(self.state.clone())
        }

        pub async fn subscribe(&self, email: &str) {
            let (status, _) = send(
                self.router(),
                post_json("/api/subscribe", serde_json::json!({ "email": email })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        pub async fn login(&self) -> String {
            let (status, json) = send(
                self.router(),
                post_json(
                    "/api/admin/login",
                    serde_json::json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            json["token"].as_str().unwrap().to_string()
        }
    }

    pub fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    pub fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn authed(mut req: Request<Body>, token: &str) -> Request<Body> {
        req.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        req
    }

    pub async fn send_raw(router: Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = router.oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = send_raw(router, req).await;
        (status, serde_json::from_str(&body).unwrap())
    }
}

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

use crate::state::RequestId;

/// Logs one line per `/api` request once the response is ready.
pub async fn request_log(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let start = Instant::now();
    let resp = next.run(req).await;

    if path.starts_with("/api") {
        info!(
            %method,
            %path,
            status = resp.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            %request_id,
            "request completed"
        );
    }
    resp
}

//! Request logging middleware.
//!
//! Logs method, matched route template, status and latency for every routed
//! request. The route template is logged instead of the concrete path so
//! bearer tokens carried in path segments never reach the log.

use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "<unmatched>".to_string());
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    tracing::info!(
        %request_id,
        %method,
        route = %route,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    if let Ok(val) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    response
}

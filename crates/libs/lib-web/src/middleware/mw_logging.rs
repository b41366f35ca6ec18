//! # Request/Response Logging Middleware
//!
//! Logs every HTTP request and response with method, path, status, duration,
//! and the request ID from [`mw_req_stamp`](crate::middleware::mw_req_stamp),
//! with credential-bearing data kept out of the logs.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sensitive headers that should not be logged
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-auth-token"];

/// Endpoints whose bodies carry credentials and must never be logged
const SENSITIVE_ENDPOINTS: &[&str] = &["/api/auth/login", "/api/auth/register"];

/// Request/response logging middleware.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());

    // Get request ID from extensions if available
    let request_id = req
        .extensions()
        .get::<crate::middleware::mw_req_stamp::RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let is_sensitive = SENSITIVE_ENDPOINTS.iter().any(|ep| path.starts_with(ep));

    // Log headers (sanitized)
    if tracing::enabled!(tracing::Level::DEBUG) {
        for (name, value) in req.headers() {
            let name_str = name.as_str();
            if SENSITIVE_HEADERS.contains(&name_str) {
                debug!("[HTTP] {} header: {}=<redacted>", request_id, name_str);
            } else if let Ok(value) = value.to_str() {
                debug!("[HTTP] {} header: {}={}", request_id, name_str, value);
            }
        }
    }

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        sensitive = is_sensitive,
        "[HTTP] --> {} {}",
        method,
        path
    );

    let res = next.run(req).await;

    let status = res.status();
    let duration = start.elapsed();

    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            status = %status,
            duration_ms = duration.as_millis(),
            "[HTTP] <-- {} {} {} ({}ms)",
            method,
            path,
            status,
            duration.as_millis()
        );
    } else {
        info!(
            request_id = %request_id,
            status = %status,
            duration_ms = duration.as_millis(),
            "[HTTP] <-- {} {} {} ({}ms)",
            method,
            path,
            status,
            duration.as_millis()
        );
    }

    res
}

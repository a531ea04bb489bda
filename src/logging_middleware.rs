// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::{to_bytes, Body};
use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use bytes::Bytes;
use tracing::debug;

/// Pretty-print a JSON body for the debug log, falling back to the raw
/// text for anything that is not JSON (multipart, images)
fn loggable_body(bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    let text = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string())),
        Err(_) => Some(text.to_string()),
    }
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = loggable_body(&bytes) {
        debug!(
            method = %parts.method,
            uri = %parts.uri,
            request_body = %body,
            "Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = loggable_body(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %body,
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loggable_body_pretty_prints_json() {
        let bytes = Bytes::from(r#"{"a":1}"#);
        let logged = loggable_body(&bytes).unwrap();
        assert!(logged.contains("\"a\": 1"));
    }

    #[test]
    fn test_loggable_body_skips_empty_and_binary() {
        assert!(loggable_body(&Bytes::new()).is_none());
        assert!(loggable_body(&Bytes::from_static(&[0xFF, 0xD8, 0xFF])).is_none());
    }
}

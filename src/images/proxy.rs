// src/images/proxy.rs
//! Pass-through proxy for third-party avatar images
//!
//! Error responses are deliberately plain text; this endpoint is consumed
//! by <img> tags, not by API clients.

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::common::AppState;

/// Upstream fetch timeout
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(10);

// Some image hosts refuse requests without browser-looking headers
const SPOOFED_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SPOOFED_REFERER: &str = "https://www.google.com/";

#[derive(Deserialize)]
pub struct ProxyImageParams {
    pub url: Option<String>,
}

/// Reject anything that is not an absolute http(s) URL
pub fn validate_proxy_url(raw: &str) -> Result<Url, &'static str> {
    let url = Url::parse(raw).map_err(|_| "Invalid URL")?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err("Invalid URL protocol"),
    }
}

pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// GET /api/proxy-image?url=<external-image-url>
pub async fn proxy_image(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<ProxyImageParams>,
) -> Response {
    let image_url = match params.url {
        Some(url) if !url.is_empty() => url,
        _ => return (StatusCode::BAD_REQUEST, "Missing image URL").into_response(),
    };

    let url = match validate_proxy_url(&image_url) {
        Ok(url) => url,
        Err(message) => {
            debug!(url = %image_url, "Rejected proxy request");
            return (StatusCode::BAD_REQUEST, message).into_response();
        }
    };

    let http = state_lock.read().await.http.clone();

    let request = http
        .get(url)
        .header(reqwest::header::USER_AGENT, SPOOFED_USER_AGENT)
        .header(reqwest::header::REFERER, SPOOFED_REFERER)
        .send();

    let response = match tokio::time::timeout(PROXY_TIMEOUT, request).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            error!(error = %e, url = %image_url, "Error proxying image");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching image").into_response();
        }
        Err(_) => {
            warn!(url = %image_url, "Image proxy upstream timed out");
            return (StatusCode::GATEWAY_TIMEOUT, "Request timeout").into_response();
        }
    };

    if !response.status().is_success() {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        return (status, "Failed to fetch image").into_response();
    }

    // Check if it's actually an image
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_image_content_type(&content_type) {
        return (StatusCode::BAD_REQUEST, "Not an image").into_response();
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, url = %image_url, "Error reading proxied image body");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching image").into_response();
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE.as_str(), content_type.as_str()),
            ("Cache-Control", "public, max-age=86400, s-maxage=86400"),
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Methods", "GET"),
        ],
        bytes,
    )
        .into_response()
}

// src/images/routes.rs

use axum::{routing::get, Router};

use super::proxy;

pub fn images_routes() -> Router {
    Router::new().route("/api/proxy-image", get(proxy::proxy_image))
}

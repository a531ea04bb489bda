// src/profile/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn profile_routes() -> Router {
    Router::new()
        .route("/api/db/save-user-profile", post(handlers::save_user_profile))
        .route("/api/db/upload-avatar", post(handlers::upload_avatar))
        .route("/api/avatars/:filename", get(handlers::serve_avatar))
}

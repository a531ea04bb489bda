// src/reviews/routes.rs

use axum::{routing::post, Router};

use super::handlers;

pub fn reviews_routes() -> Router {
    Router::new()
        .route("/api/db/get-reviews", post(handlers::get_reviews))
        .route("/api/db/insert-review", post(handlers::insert_review))
}

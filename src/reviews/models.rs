// src/reviews/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A published customer review. Rows are immutable; `username` and
/// `image` are snapshots taken at submission time, not live joins.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub rating: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub created_at: Option<String>,
}

impl Review {
    /// URL the reviewer's avatar renders from: external images route
    /// through the proxy, anything unusable becomes the placeholder
    pub fn display_image_url(&self) -> String {
        crate::images::resolve_image_url(&self.image)
    }
}

/// POST /api/db/get-reviews request body
#[derive(Deserialize, Debug, Default)]
pub struct GetReviewsRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Page of reviews plus the authoritative total
#[derive(Serialize, Deserialize, Debug)]
pub struct GetReviewsResponse {
    pub data: Vec<Review>,
    pub count: i64,
}

/// POST /api/db/insert-review request body
#[derive(Deserialize, Debug)]
pub struct InsertReviewRequest {
    pub rating: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// A review as composed in the submission form, before the server stamps
/// identity and id onto it
#[derive(Debug, Clone, Default)]
pub struct ReviewDraft {
    pub title: String,
    pub description: String,
    pub rating: i64,
    pub image: String,
}

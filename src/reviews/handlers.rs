// src/reviews/handlers.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::models::*;
use super::validators::ReviewValidator;
use crate::auth::AuthedUser;
use crate::common::{email_local_part, generate_review_id, ApiError, AppState, Validator};
use crate::images::PLACEHOLDER_IMAGE;

/// POST /api/db/get-reviews - Paginated review listing (public)
///
/// The total count comes from a separate query so the client can keep an
/// authoritative counter while loading incrementally.
pub async fn get_reviews(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<GetReviewsRequest>,
) -> Result<Json<GetReviewsResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let offset = request.offset.unwrap_or(0);

    let data = if offset > 0 {
        let limit = request.limit.unwrap_or(10);
        sqlx::query_as::<_, Review>(
            r#"SELECT id, user_id, username, rating, title, description, image, created_at
            FROM reviews
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
    } else if let Some(limit) = request.limit {
        sqlx::query_as::<_, Review>(
            r#"SELECT id, user_id, username, rating, title, description, image, created_at
            FROM reviews
            ORDER BY created_at DESC
            LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
    } else {
        sqlx::query_as::<_, Review>(
            r#"SELECT id, user_id, username, rating, title, description, image, created_at
            FROM reviews
            ORDER BY created_at DESC"#,
        )
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
    };

    debug!(
        returned = data.len(),
        total = count,
        offset = offset,
        "Served review page"
    );

    Ok(Json(GetReviewsResponse { data, count }))
}

/// POST /api/db/insert-review - Submit a review (authenticated)
///
/// Re-validates the title and rating bounds independently of the client.
pub async fn insert_review(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<InsertReviewRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = ReviewValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Snapshot the display name: sign-up metadata, else email local part
    let username = authed
        .full_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            let local = email_local_part(&authed.email);
            if local.is_empty() {
                "User".to_string()
            } else {
                local.to_string()
            }
        });

    let image = request
        .image
        .filter(|image| !image.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let review_id = generate_review_id();

    sqlx::query(
        r#"
        INSERT INTO reviews (id, user_id, username, rating, title, description, image)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&review_id)
    .bind(&authed.id)
    .bind(&username)
    .bind(request.rating)
    .bind(&request.title)
    .bind(&request.description)
    .bind(&image)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = %authed.id, "Error inserting review");
        ApiError::DatabaseError(e)
    })?;

    info!(
        review_id = %review_id,
        user_id = %authed.id,
        rating = request.rating,
        "Review inserted successfully"
    );

    Ok(Json(MessageResponse {
        message: "Review inserted successfully".to_string(),
    }))
}

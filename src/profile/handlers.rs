// src/profile/handlers.rs

use axum::{
    extract::{Extension, Json, Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use infer::Infer;
use std::sync::Arc;
use tokio::fs as tokio_fs;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{AvatarUploadResponse, MessageResponse, SaveProfileRequest};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

// File size limit: 5MB
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// POST /api/db/save-user-profile - Upsert the caller's profile
pub async fn save_user_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<SaveProfileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if request.full_name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Full name and email are required".to_string(),
        ));
    }

    let phone = request.phone.filter(|phone| !phone.is_empty());
    let avatar_url = request.avatar_url.filter(|url| !url.is_empty());

    sqlx::query(
        r#"
        INSERT INTO profiles (auth_id, full_name, email, phone, avatar_url)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(auth_id) DO UPDATE SET
            full_name = excluded.full_name,
            email = excluded.email,
            phone = excluded.phone,
            avatar_url = excluded.avatar_url,
            updated_at = datetime('now')
        "#,
    )
    .bind(&authed.id)
    .bind(request.full_name.trim())
    .bind(request.email.trim())
    .bind(&phone)
    .bind(&avatar_url)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, auth_id = %authed.id, "Error saving user profile");
        ApiError::DatabaseError(e)
    })?;

    info!(auth_id = %authed.id, "User profile saved");

    Ok(Json(MessageResponse {
        message: "User profile saved successfully".to_string(),
    }))
}

/// POST /api/db/upload-avatar - Upload an avatar image (multipart)
///
/// The blob lands in the hosted object store when it is configured,
/// otherwise on local disk served through /api/avatars.
pub async fn upload_avatar(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarUploadResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    info!(user_id = %authed.id, "Avatar upload initiated");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read file data".to_string()))?;

        if data.len() > MAX_FILE_SIZE {
            return Err(ApiError::BadRequest(
                "File size must be less than 5MB".to_string(),
            ));
        }

        // Sniff the content type from magic bytes, not the client header
        let content_type = match image_content_type(&data) {
            Some(content_type) => content_type,
            None => {
                return Err(ApiError::BadRequest(
                    "Invalid file type. Only JPEG, PNG, and WebP are allowed.".to_string(),
                ));
            }
        };

        let extension = extension_for(&filename);
        let stored_name = format!("{}-{}.{}", authed.id, Utc::now().timestamp_millis(), extension);

        let (url, path) = store_avatar(&state, &stored_name, &data, content_type).await?;

        info!(user_id = %authed.id, path = %path, "Avatar uploaded successfully");

        return Ok(Json(AvatarUploadResponse { url, path }));
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}

/// GET /api/avatars/:filename - Serve locally stored avatars
pub async fn serve_avatar(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    // Sanitize filename to prevent path traversal
    let safe_filename = sanitize_filename(&filename);
    let file_path = state.avatars_dir.join(&safe_filename);

    if !file_path.exists() {
        return Err(ApiError::NotFound("Avatar not found".to_string()));
    }

    let file_content = tokio_fs::read(&file_path)
        .await
        .map_err(|_| ApiError::InternalServer("Failed to read avatar file".to_string()))?;

    let content_type = content_type_for_extension(&safe_filename);

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", content_type),
            ("Cache-Control", "public, max-age=31536000"),
        ],
        file_content,
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Store the avatar: object store when configured, local disk otherwise.
/// Returns (public url, storage path).
async fn store_avatar(
    state: &AppState,
    stored_name: &str,
    data: &[u8],
    content_type: &'static str,
) -> Result<(String, String), ApiError> {
    if state.storage_service.is_configured() {
        let key = format!("avatars/{}", stored_name);
        match state
            .storage_service
            .upload_object(data.to_vec(), &key, content_type)
            .await
        {
            Ok(url) => return Ok((url, key)),
            Err(e) => {
                warn!(error = %e, key = %key, "Object store upload failed, falling back to local disk");
            }
        }
    }

    tokio_fs::create_dir_all(&state.avatars_dir).await.map_err(|e| {
        error!(error = %e, "Failed to create avatars directory");
        ApiError::InternalServer("Failed to save avatar file".to_string())
    })?;

    let file_path = state.avatars_dir.join(stored_name);
    tokio_fs::write(&file_path, data).await.map_err(|e| {
        error!(error = %e, file_path = %file_path.display(), "Failed to save avatar file");
        ApiError::InternalServer("Failed to save avatar file".to_string())
    })?;

    let url = format!("/api/avatars/{}", stored_name);
    Ok((url.clone(), url))
}

/// Accepted avatar content type from magic bytes, `None` otherwise
fn image_content_type(data: &[u8]) -> Option<&'static str> {
    let infer = Infer::new();
    match infer.get(data).map(|info| info.mime_type()) {
        Some("image/jpeg") | Some("image/jpg") => Some("image/jpeg"),
        Some("image/png") => Some("image/png"),
        Some("image/webp") => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(filename: &str) -> &str {
    filename
        .rsplit('.')
        .next()
        .filter(|ext| matches!(*ext, "jpg" | "jpeg" | "png" | "webp"))
        .unwrap_or("jpg")
}

fn content_type_for_extension(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

fn sanitize_filename(filename: &str) -> String {
    let cleaned = filename
        .replace("..", "")
        .replace(['/', '\\', '\0'], "");

    let sanitized: String = cleaned
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .take(255)
        .collect();

    if sanitized.is_empty() {
        "sanitized_file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("a/b\\c.png"), "abc.png");
        assert_eq!(sanitize_filename(""), "sanitized_file");
    }

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("me.PNG"), "jpg"); // case-sensitive whitelist
        assert_eq!(extension_for("me.png"), "png");
        assert_eq!(extension_for("me.webp"), "webp");
        assert_eq!(extension_for("noext"), "jpg");
    }

    #[test]
    fn test_image_content_type_sniffs_magic_bytes() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(image_content_type(&png_header), Some("image/png"));

        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0];
        assert_eq!(image_content_type(&jpeg_header), Some("image/jpeg"));

        let gif_header = *b"GIF89a\x00\x00\x00\x00";
        assert_eq!(image_content_type(&gif_header), None);

        assert_eq!(image_content_type(b"not an image"), None);
    }
}

// src/profile/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Customer profile row, keyed by the hosted auth identity.
/// Created at most once per identity (upsert on auth_id).
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    pub auth_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// POST /api/db/save-user-profile request body
#[derive(Serialize, Deserialize, Debug)]
pub struct SaveProfileRequest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

/// POST /api/db/upload-avatar response body
#[derive(Serialize, Deserialize, Debug)]
pub struct AvatarUploadResponse {
    pub url: String,
    pub path: String,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

//! Authentication data models

use serde::{Deserialize, Serialize};

/// Claims carried by the hosted provider's access tokens (HS256)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Free-form identity metadata captured at sign-up
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Identity record as the hosted provider reports it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// An issued session: opaque token, expiry, and the identity it belongs to
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) the access token expires at
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self, now_unix: i64) -> bool {
        now_unix >= self.expires_at
    }
}

/// Profile fields forwarded to the provider as sign-up metadata
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub phone: String,
}

/// An avatar picked in the sign-up form, held in memory until the
/// persistence step decides where it lands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvatarFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl AvatarFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// File extension taken from the original name, defaulting to jpg
    pub fn extension(&self) -> &str {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| matches!(*ext, "jpg" | "jpeg" | "png" | "webp"))
            .unwrap_or("jpg")
    }
}

/// Sign-in form payload
#[derive(Debug, Clone, Default)]
pub struct SignInData {
    pub email: String,
    pub password: String,
}

/// Sign-up form payload; field names surface in validation errors using
/// the wire-facing camelCase paths
#[derive(Debug, Clone, Default)]
pub struct SignUpData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub avatar: Option<AvatarFile>,
}

//! Shared fixtures for module tests

use std::sync::{Arc, Mutex};

use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::RwLock;

use crate::auth::{AuthUser, AuthedUser, Session, UserMetadata};
use crate::common::{migrations, AppState, Notifier, Toast};
use crate::services::{EmailService, StorageService};

/// In-memory application state with a migrated database and no hosted
/// services configured
pub async fn test_state() -> Arc<RwLock<AppState>> {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");

    migrations::run_migrations(&pool).await.expect("migrations");

    Arc::new(RwLock::new(AppState {
        db: pool,
        avatars_dir: std::env::temp_dir().join("studio-api-test-avatars"),
        http: reqwest::Client::new(),
        auth_jwt_secret: "test_secret".to_string(),
        contact_inbox: None,
        storage_service: Arc::new(StorageService::new(None)),
        email_service: Arc::new(EmailService::new(None)),
    }))
}

pub fn authed_user(id: &str, email: &str, full_name: Option<&str>) -> AuthedUser {
    AuthedUser {
        id: id.to_string(),
        email: email.to_string(),
        full_name: full_name.map(str::to_string),
        phone: None,
        avatar_url: None,
    }
}

pub fn session_for(id: &str, email: &str, full_name: Option<&str>) -> Session {
    Session {
        access_token: "test-access-token".to_string(),
        refresh_token: None,
        expires_at: 9_999_999_999,
        user: AuthUser {
            id: id.to_string(),
            email: email.to_string(),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
                phone: None,
                avatar_url: None,
            },
        },
    }
}

/// Notifier that records toasts for assertions
#[derive(Default)]
pub struct RecordingNotifier {
    pub toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::{EmailService, StorageService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub avatars_dir: PathBuf,
    pub http: Client,
    /// Secret the hosted auth provider signs access tokens with
    pub auth_jwt_secret: String,
    /// Studio inbox for contact form submissions, when email is configured
    pub contact_inbox: Option<String>,
    pub storage_service: Arc<StorageService>,
    pub email_service: Arc<EmailService>,
}

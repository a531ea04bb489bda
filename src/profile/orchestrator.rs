// src/profile/orchestrator.rs
//! Post-auth profile/avatar persistence
//!
//! After a sign-up that yielded a session, the avatar blob and the
//! profile row are written with a primary path (direct store write) and
//! a REST fallback, partial success tracked per step. The transient
//! session is always signed back out at the end so the confirmation /
//! sign-in flow stays the canonical entry point.

use chrono::Utc;
use futures::FutureExt;
use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::models::{AvatarUploadResponse, Profile, SaveProfileRequest};
use super::persist::{try_in_order, Strategy};
use crate::auth::{AuthProvider, AuthUser, AvatarFile, Session, SignUpData};
use crate::common::{email_local_part, Locale, Notifier, Toast};
use crate::services::StorageService;

/// User-visible result of the post-sign-up persistence run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Session existed and the profile was saved
    Success,
    /// No session yet: the provider wants the email confirmed first
    PendingConfirmation,
    /// Session existed but the profile could not be saved anywhere
    PartialFailure,
}

impl SignupOutcome {
    pub fn from_flags(session_present: bool, profile_saved: bool) -> Self {
        if !session_present {
            SignupOutcome::PendingConfirmation
        } else if profile_saved {
            SignupOutcome::Success
        } else {
            SignupOutcome::PartialFailure
        }
    }
}

pub struct PersistenceOrchestrator {
    db: SqlitePool,
    storage: Arc<StorageService>,
    http: Client,
    api_base: String,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
}

impl PersistenceOrchestrator {
    pub fn new(
        db: SqlitePool,
        storage: Arc<StorageService>,
        http: Client,
        api_base: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        locale: Locale,
    ) -> Self {
        Self {
            db,
            storage,
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            notifier,
            locale,
        }
    }

    /// Run the whole post-sign-up sequence and surface one of the three
    /// outcome notifications
    pub async fn complete_signup<P: AuthProvider>(
        &self,
        provider: &P,
        user: &AuthUser,
        session: Option<&Session>,
        data: &SignUpData,
    ) -> SignupOutcome {
        let messages = self.locale.messages();

        let session = match session {
            Some(session) => session,
            None => {
                // Email confirmation pending; nothing to persist yet
                self.notifier
                    .notify(Toast::success(messages.signup_check_email));
                return SignupOutcome::PendingConfirmation;
            }
        };

        // Step 1: avatar, when one was picked. Losing it is non-fatal.
        let avatar_url = match &data.avatar {
            Some(avatar) => self.upload_avatar(session, &user.id, avatar).await,
            None => None,
        };

        // Step 2: the profile row itself
        let profile_saved = self
            .save_profile(session, &user.id, data, avatar_url.as_deref())
            .await;

        // Step 3: read back what was written
        if profile_saved && !self.verify_profile(&user.id).await {
            warn!(auth_id = %user.id, "Profile verification read found no row");
            self.notifier
                .notify(Toast::error(messages.profile_verify_warning));
        }

        // Step 4: drop the transient session no matter what happened
        if let Err(e) = provider.sign_out().await {
            warn!(error = %e, "Failed to sign transient post-signup session out");
        }

        let outcome = SignupOutcome::from_flags(true, profile_saved);
        match outcome {
            SignupOutcome::Success => {
                info!(auth_id = %user.id, "Sign-up persistence completed");
                self.notifier.notify(Toast::success(messages.signup_success));
            }
            SignupOutcome::PartialFailure => {
                error!(auth_id = %user.id, "Sign-up persistence failed on every path");
                self.notifier
                    .notify(Toast::error(messages.signup_profile_failed));
            }
            SignupOutcome::PendingConfirmation => unreachable!("session was present"),
        }

        outcome
    }

    /// On sign-in: create the profile lazily when missing, otherwise
    /// reconcile fields the session metadata disagrees on. Never
    /// overwrites a stored value with empty metadata.
    pub async fn ensure_profile_on_sign_in(&self, session: &Session) {
        let user = &session.user;

        let existing = match self.fetch_profile(&user.id).await {
            Ok(existing) => existing,
            Err(e) => {
                error!(error = %e, auth_id = %user.id, "Profile lookup failed on sign-in");
                return;
            }
        };

        match existing {
            None => {
                let metadata = &user.user_metadata;
                let full_name = metadata
                    .full_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| {
                        let local = email_local_part(&user.email);
                        if local.is_empty() {
                            "User".to_string()
                        } else {
                            local.to_string()
                        }
                    });
                let phone = metadata.phone.clone().filter(|phone| !phone.is_empty());

                let data = SignUpData {
                    full_name,
                    email: user.email.clone(),
                    phone: phone.unwrap_or_default(),
                    ..SignUpData::default()
                };

                if !self.save_profile(session, &user.id, &data, None).await {
                    error!(auth_id = %user.id, "Could not create profile on sign-in");
                }
            }
            Some(profile) => {
                self.reconcile_profile(&profile, user).await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Write paths
    // ------------------------------------------------------------------

    /// Avatar upload: object store first, REST endpoint second.
    /// Returns the public URL, or `None` after both paths failed.
    async fn upload_avatar(
        &self,
        session: &Session,
        user_id: &str,
        avatar: &AvatarFile,
    ) -> Option<String> {
        let key = format!(
            "avatars/{}-{}.{}",
            user_id,
            Utc::now().timestamp_millis(),
            avatar.extension()
        );

        let direct = {
            let storage = self.storage.clone();
            let data = avatar.data.clone();
            let content_type = avatar.content_type.clone();
            let key = key.clone();
            async move {
                storage
                    .upload_object(data, &key, &content_type)
                    .await
                    .map_err(anyhow::Error::from)
            }
            .boxed()
        };

        let fallback = self.upload_via_endpoint(session, avatar).boxed();

        let strategies: Vec<Strategy<'_, String>> =
            vec![("object-store", direct), ("upload-endpoint", fallback)];

        match try_in_order("avatar-upload", strategies).await {
            Ok((url, strategy)) => {
                info!(user_id = %user_id, strategy = %strategy, "Avatar persisted");
                Some(url)
            }
            Err(attempts) => {
                error!(
                    user_id = %user_id,
                    attempts = ?attempts,
                    "Avatar upload failed on every path, continuing without one"
                );
                None
            }
        }
    }

    async fn upload_via_endpoint(
        &self,
        session: &Session,
        avatar: &AvatarFile,
    ) -> anyhow::Result<String> {
        let part = reqwest::multipart::Part::bytes(avatar.data.clone())
            .file_name(avatar.name.clone())
            .mime_str(&avatar.content_type)?;
        let form = reqwest::multipart::Form::new().part("avatar", part);

        let response = self
            .http
            .post(format!("{}/api/db/upload-avatar", self.api_base))
            .bearer_auth(&session.access_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("upload endpoint answered {}", response.status());
        }

        let body: AvatarUploadResponse = response.json().await?;
        Ok(body.url)
    }

    /// Profile upsert: direct relational write first, REST second
    async fn save_profile(
        &self,
        session: &Session,
        auth_id: &str,
        data: &SignUpData,
        avatar_url: Option<&str>,
    ) -> bool {
        let direct = {
            let db = self.db.clone();
            let auth_id = auth_id.to_string();
            let full_name = data.full_name.clone();
            let email = data.email.clone();
            let phone = Some(data.phone.clone()).filter(|phone| !phone.is_empty());
            let avatar_url = avatar_url.map(str::to_string);
            async move {
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
                .bind(&auth_id)
                .bind(&full_name)
                .bind(&email)
                .bind(&phone)
                .bind(&avatar_url)
                .execute(&db)
                .await
                .map(|_| ())
                .map_err(anyhow::Error::from)
            }
            .boxed()
        };

        let fallback = self
            .save_via_endpoint(session, data, avatar_url)
            .boxed();

        let strategies: Vec<Strategy<'_, ()>> =
            vec![("relational-store", direct), ("save-endpoint", fallback)];

        match try_in_order("profile-upsert", strategies).await {
            Ok((_, strategy)) => {
                info!(auth_id = %auth_id, strategy = %strategy, "Profile saved");
                true
            }
            Err(attempts) => {
                error!(
                    auth_id = %auth_id,
                    attempts = ?attempts,
                    "Profile save failed on every path"
                );
                false
            }
        }
    }

    async fn save_via_endpoint(
        &self,
        session: &Session,
        data: &SignUpData,
        avatar_url: Option<&str>,
    ) -> anyhow::Result<()> {
        let request = SaveProfileRequest {
            full_name: data.full_name.clone(),
            email: data.email.clone(),
            phone: Some(data.phone.clone()).filter(|phone| !phone.is_empty()),
            avatar_url: avatar_url.map(str::to_string),
        };

        let response = self
            .http
            .post(format!("{}/api/db/save-user-profile", self.api_base))
            .bearer_auth(&session.access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("save endpoint answered {}", response.status());
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads and reconciliation
    // ------------------------------------------------------------------

    async fn fetch_profile(&self, auth_id: &str) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE auth_id = ?")
            .bind(auth_id)
            .fetch_optional(&self.db)
            .await
    }

    async fn verify_profile(&self, auth_id: &str) -> bool {
        matches!(self.fetch_profile(auth_id).await, Ok(Some(_)))
    }

    /// Update only fields where the session metadata is non-empty and
    /// disagrees with the stored row
    async fn reconcile_profile(&self, profile: &Profile, user: &AuthUser) {
        let metadata = &user.user_metadata;

        let new_full_name = metadata
            .full_name
            .as_deref()
            .filter(|name| !name.is_empty() && *name != profile.full_name);

        let new_phone = metadata
            .phone
            .as_deref()
            .filter(|phone| !phone.is_empty() && Some(*phone) != profile.phone.as_deref());

        if new_full_name.is_none() && new_phone.is_none() {
            return;
        }

        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                full_name = COALESCE(?, full_name),
                phone = COALESCE(?, phone),
                updated_at = datetime('now')
            WHERE auth_id = ?
            "#,
        )
        .bind(new_full_name)
        .bind(new_phone)
        .bind(&profile.auth_id)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => info!(auth_id = %profile.auth_id, "Profile reconciled from session metadata"),
            Err(e) => error!(error = %e, auth_id = %profile.auth_id, "Profile reconciliation failed"),
        }
    }
}

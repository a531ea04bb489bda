//! Client for the hosted auth provider's REST surface
//!
//! The provider owns password storage, session issuance, and the email
//! confirmation flow. This client mirrors the hosted SDK: it keeps the
//! most recently issued session in a slot so callers can ask for the
//! current session later (the post-sign-up polling path relies on this).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{AuthUser, Session, SignUpMetadata};
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("auth provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("auth provider returned a malformed response: {0}")]
    Malformed(String),
}

/// Outcome of a sign-up call; the session is absent when the provider
/// requires email confirmation before issuing one
#[derive(Debug, Clone)]
pub struct SignUpResponse {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Seam for the hosted auth provider, so flows can be exercised against
/// a scripted implementation in tests
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpResponse, ProviderError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// The session the provider currently holds for this client, if any.
    /// May become available some time after sign-up when confirmation is
    /// processed out of band.
    async fn current_session(&self) -> Option<Session>;
}

pub struct HostedAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

/// Token payload shape shared by the sign-in and refresh grants
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| Utc::now().timestamp() + self.expires_in.unwrap_or(3600));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

impl HostedAuthClient {
    pub fn new(http: Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    /// Pull the provider's error message out of its JSON error body
    async fn rejection(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error_description")
                .or_else(|| body.get("msg"))
                .or_else(|| body.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("Authentication request was rejected")
                .to_string(),
            Err(_) => "Authentication request was rejected".to_string(),
        };
        ProviderError::Rejected { status, message }
    }

    async fn store_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    /// Exchange the refresh token for a fresh session
    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let response = self
            .http
            .post(self.endpoint("/token?grant_type=refresh_token"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(token.into_session())
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<SignUpResponse, ProviderError> {
        debug!(email = %safe_email_log(email), "Signing up with hosted auth provider");

        let response = self
            .http
            .post(self.endpoint("/signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": {
                    "full_name": metadata.full_name,
                    "phone": metadata.phone,
                },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::rejection(response).await;
            warn!(email = %safe_email_log(email), error = %err, "Sign-up rejected by provider");
            return Err(err);
        }

        // With confirmation disabled the provider answers with a full
        // session; otherwise it answers with the bare user record.
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)
                .map_err(|e| ProviderError::Malformed(e.to_string()))?;
            let session = token.into_session();
            self.store_session(Some(session.clone())).await;
            Ok(SignUpResponse {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: AuthUser = serde_json::from_value(body)
                .map_err(|e| ProviderError::Malformed(e.to_string()))?;
            Ok(SignUpResponse {
                user,
                session: None,
            })
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        debug!(email = %safe_email_log(email), "Signing in with hosted auth provider");

        let response = self
            .http
            .post(self.endpoint("/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::rejection(response).await;
            warn!(email = %safe_email_log(email), error = %err, "Sign-in rejected by provider");
            return Err(err);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let session = token.into_session();
        self.store_session(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let session = self.session.read().await.clone();

        if let Some(session) = session {
            let response = self
                .http
                .post(self.endpoint("/logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await?;

            // The local session is dropped either way; the provider may
            // have already revoked the token server-side.
            if !response.status().is_success() {
                let err = Self::rejection(response).await;
                error!(error = %err, "Provider sign-out failed, dropping local session anyway");
                self.store_session(None).await;
                return Err(err);
            }
        }

        self.store_session(None).await;
        Ok(())
    }

    async fn current_session(&self) -> Option<Session> {
        let session = self.session.read().await.clone()?;

        if !session.is_expired(Utc::now().timestamp()) {
            return Some(session);
        }

        // Expired: attempt a silent refresh, drop the session if it fails
        match &session.refresh_token {
            Some(refresh_token) => match self.refresh(refresh_token).await {
                Ok(renewed) => {
                    self.store_session(Some(renewed.clone())).await;
                    Some(renewed)
                }
                Err(e) => {
                    warn!(error = %e, "Session refresh failed, treating as signed out");
                    self.store_session(None).await;
                    None
                }
            },
            None => {
                self.store_session(None).await;
                None
            }
        }
    }
}

//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::Claims;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated customer extractor
///
/// Validates the bearer token issued by the hosted auth provider (HS256,
/// shared secret) and exposes the identity and its sign-up metadata.
/// Identity records themselves live with the provider; no local lookup.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let jwt_secret = state_lock.read().await.auth_jwt_secret.clone();

        // Extract Bearer token from Authorization header
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized(
                    "Unauthorized. Please sign in.".into(),
                ));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = if let Some(rest) = token.strip_prefix("Bearer ") {
            rest.to_string()
        } else {
            token
        };

        let decoded = match decode::<Claims>(
            &bare_token,
            &DecodingKey::from_secret(jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "Access token validation failed");
                return Err(ApiError::Unauthorized(
                    "Unauthorized. Please sign in.".into(),
                ));
            }
        };

        let claims = decoded.claims;
        debug!(
            user_id = %claims.sub,
            email = %safe_email_log(&claims.email),
            "Customer authenticated via access token"
        );

        Ok(AuthedUser {
            id: claims.sub,
            email: claims.email,
            full_name: claims.user_metadata.full_name,
            phone: claims.user_metadata.phone,
            avatar_url: claims.user_metadata.avatar_url,
        })
    }
}

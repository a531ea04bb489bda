//! Tests for the auth module
//!
//! Covers access-token claims, the sign-in/sign-up validators, the form
//! revalidation dependency graph, and the session manager state machine
//! driven by a scripted provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::form::{FieldId, SignUpForm};
use super::models::*;
use super::provider::{AuthProvider, ProviderError, SignUpResponse};
use super::session::{session_poll_delays, AuthState, SessionManager};
use super::validators::*;
use crate::common::{Locale, Notifier, Toast, ToastKind, Validator};

// ----------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------

fn test_user() -> AuthUser {
    AuthUser {
        id: "auth-user-1".to_string(),
        email: "maria@example.com".to_string(),
        user_metadata: UserMetadata {
            full_name: Some("María Pérez".to_string()),
            phone: Some("(809) 573-4173".to_string()),
            avatar_url: None,
        },
    }
}

fn test_session() -> Session {
    Session {
        access_token: "token-abc".to_string(),
        refresh_token: Some("refresh-abc".to_string()),
        expires_at: 9_999_999_999,
        user: test_user(),
    }
}

fn valid_sign_up() -> SignUpData {
    SignUpData {
        full_name: "María Pérez".to_string(),
        email: "maria@example.com".to_string(),
        phone: "(809) 573-4173".to_string(),
        password: "Secreto1".to_string(),
        confirm_password: "Secreto1".to_string(),
        avatar: None,
    }
}

#[derive(Default)]
struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

/// Provider with pre-scripted responses; `current_session` answers are
/// consumed one per poll
#[derive(Default)]
struct ScriptedProvider {
    sign_up_response: Mutex<Option<Result<SignUpResponse, ProviderError>>>,
    sign_in_response: Mutex<Option<Result<Session, ProviderError>>>,
    poll_sessions: Mutex<VecDeque<Option<Session>>>,
}

#[async_trait]
impl AuthProvider for ScriptedProvider {
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: &SignUpMetadata,
    ) -> Result<SignUpResponse, ProviderError> {
        self.sign_up_response
            .lock()
            .unwrap()
            .take()
            .expect("unexpected sign_up call")
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, ProviderError> {
        self.sign_in_response
            .lock()
            .unwrap()
            .take()
            .expect("unexpected sign_in call")
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn current_session(&self) -> Option<Session> {
        self.poll_sessions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(None)
    }
}

fn rejected(message: &str) -> ProviderError {
    ProviderError::Rejected {
        status: reqwest::StatusCode::BAD_REQUEST,
        message: message.to_string(),
    }
}

// ----------------------------------------------------------------------
// Access token claims
// ----------------------------------------------------------------------

#[test]
fn test_claims_roundtrip_through_hs256() {
    let secret = "test_secret_key";
    let claims = Claims {
        sub: "auth-user-1".to_string(),
        email: "maria@example.com".to_string(),
        exp: 9_999_999_999,
        user_metadata: UserMetadata {
            full_name: Some("María Pérez".to_string()),
            phone: None,
            avatar_url: None,
        },
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode token");

    let decoded = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("Failed to decode token");

    assert_eq!(decoded.claims.sub, "auth-user-1");
    assert_eq!(
        decoded.claims.user_metadata.full_name.as_deref(),
        Some("María Pérez")
    );
}

#[test]
fn test_claims_validation_fails_with_wrong_secret() {
    let claims = Claims {
        sub: "auth-user-1".to_string(),
        email: "maria@example.com".to_string(),
        exp: 9_999_999_999,
        user_metadata: UserMetadata::default(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"right_secret"),
    )
    .expect("Failed to encode token");

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"wrong_secret"),
        &Validation::new(Algorithm::HS256),
    );

    assert!(result.is_err(), "Token validation should fail with wrong secret");
}

#[test]
fn test_session_expiry() {
    let session = test_session();
    assert!(!session.is_expired(9_999_999_998));
    assert!(session.is_expired(9_999_999_999));
}

// ----------------------------------------------------------------------
// Validators
// ----------------------------------------------------------------------

#[test]
fn test_sign_in_validator_accepts_valid_credentials() {
    let result = SignInValidator.validate(&SignInData {
        email: "maria@example.com".to_string(),
        password: "secret1".to_string(),
    });
    assert!(result.is_valid);
}

#[test]
fn test_sign_in_validator_rejects_short_password() {
    let result = SignInValidator.validate(&SignInData {
        email: "maria@example.com".to_string(),
        password: "abc".to_string(),
    });
    assert!(!result.is_valid);
    assert_eq!(
        result.error_for("password"),
        Some("Password must be at least 6 characters")
    );
}

#[test]
fn test_sign_up_validator_accepts_valid_data() {
    let result = SignUpValidator.validate(&valid_sign_up());
    assert!(result.is_valid, "errors: {:?}", result.errors);
}

#[test]
fn test_password_mismatch_reports_on_confirm_password() {
    let mut data = valid_sign_up();
    data.confirm_password = "Secreto2".to_string();

    let result = SignUpValidator.validate(&data);
    assert!(!result.is_valid);
    assert_eq!(result.error_for("confirmPassword"), Some("Passwords don't match"));
    assert!(result.error_for("password").is_none());
}

#[test]
fn test_phone_digit_bounds() {
    // Formatted local number: passes shape and has 10 digits
    let mut data = valid_sign_up();
    data.phone = "(809) 573-4173".to_string();
    assert!(SignUpValidator.validate(&data).is_valid);

    // Too few digits
    data.phone = "123".to_string();
    let result = SignUpValidator.validate(&data);
    assert_eq!(
        result.error_for("phone"),
        Some("Phone number must have at least 10 digits")
    );

    // 18 digits: rejected whichever rule trips first
    data.phone = "+1 809 573 4173 9999999".to_string();
    assert!(SignUpValidator.validate(&data).error_for("phone").is_some());
}

#[test]
fn test_phone_digits_normalization() {
    assert_eq!(phone_digits("(809) 573-4173"), "8095734173");
    assert_eq!(phone_digits("+1.809.573.4173"), "18095734173");
}

#[test]
fn test_password_character_classes() {
    let mut data = valid_sign_up();

    data.password = "secreto1".to_string();
    data.confirm_password = data.password.clone();
    assert_eq!(
        SignUpValidator.validate(&data).error_for("password"),
        Some("Password must contain at least one uppercase letter")
    );

    data.password = "SECRETO1".to_string();
    data.confirm_password = data.password.clone();
    assert_eq!(
        SignUpValidator.validate(&data).error_for("password"),
        Some("Password must contain at least one lowercase letter")
    );

    data.password = "Secretos".to_string();
    data.confirm_password = data.password.clone();
    assert_eq!(
        SignUpValidator.validate(&data).error_for("password"),
        Some("Password must contain at least one number")
    );
}

#[test]
fn test_full_name_allows_accents_rejects_symbols() {
    let mut data = valid_sign_up();

    data.full_name = "José Ñáñez".to_string();
    assert!(SignUpValidator.validate(&data).is_valid);

    data.full_name = "x".to_string();
    assert_eq!(
        SignUpValidator.validate(&data).error_for("fullName"),
        Some("Full name must be at least 2 characters")
    );

    data.full_name = "R2-D2".to_string();
    assert_eq!(
        SignUpValidator.validate(&data).error_for("fullName"),
        Some("Full name can only contain letters and spaces")
    );
}

#[test]
fn test_avatar_size_and_type_limits() {
    let mut data = valid_sign_up();

    data.avatar = Some(AvatarFile {
        name: "me.png".to_string(),
        content_type: "image/png".to_string(),
        data: vec![0; 1024],
    });
    assert!(SignUpValidator.validate(&data).is_valid);

    data.avatar = Some(AvatarFile {
        name: "big.png".to_string(),
        content_type: "image/png".to_string(),
        data: vec![0; MAX_AVATAR_BYTES + 1],
    });
    assert_eq!(
        SignUpValidator.validate(&data).error_for("avatar"),
        Some("Image size must be less than 5MB")
    );

    data.avatar = Some(AvatarFile {
        name: "movie.gif".to_string(),
        content_type: "image/gif".to_string(),
        data: vec![0; 10],
    });
    assert_eq!(
        SignUpValidator.validate(&data).error_for("avatar"),
        Some("Image must be JPEG, PNG, or WebP")
    );
}

// ----------------------------------------------------------------------
// Form dependency graph
// ----------------------------------------------------------------------

#[test]
fn test_editing_password_revalidates_confirm_password() {
    let mut form = SignUpForm::new();
    form.set_password("Secreto1".to_string());
    form.set_confirm_password("Secreto1".to_string());
    form.touch(FieldId::Password);
    form.touch(FieldId::ConfirmPassword);
    assert!(form.error(FieldId::ConfirmPassword).is_none());

    // Changing the password alone must re-check the confirmation field
    form.set_password("Secreto2".to_string());
    assert_eq!(
        form.error(FieldId::ConfirmPassword),
        Some("Passwords don't match")
    );

    // And bringing the confirmation back in line clears it
    form.set_confirm_password("Secreto2".to_string());
    assert!(form.error(FieldId::ConfirmPassword).is_none());
}

#[test]
fn test_untouched_fields_stay_silent() {
    let mut form = SignUpForm::new();
    form.set_email("not-an-email".to_string());
    assert!(form.error(FieldId::Email).is_none());

    form.touch(FieldId::Email);
    assert_eq!(form.error(FieldId::Email), Some("Invalid email address"));
}

#[test]
fn test_validate_all_touches_everything() {
    let mut form = SignUpForm::new();
    let result = form.validate_all();
    assert!(!result.is_valid);
    assert_eq!(form.error(FieldId::FullName), Some("Full name is required"));
    assert_eq!(
        form.error(FieldId::ConfirmPassword),
        Some("Please confirm your password")
    );
}

// ----------------------------------------------------------------------
// Session manager
// ----------------------------------------------------------------------

#[test]
fn test_session_poll_schedule() {
    let delays = session_poll_delays();
    assert_eq!(delays.len(), 3);
    assert_eq!(delays[0].as_secs(), 1);
    assert_eq!(delays[1].as_secs(), 2);
    assert_eq!(delays[2].as_secs(), 3);
}

#[tokio::test]
async fn test_sign_in_success_transitions_to_authenticated() {
    let provider = ScriptedProvider::default();
    *provider.sign_in_response.lock().unwrap() = Some(Ok(test_session()));

    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = SessionManager::new(provider, notifier.clone(), Locale::En);
    assert_eq!(*manager.state(), AuthState::Loading);

    let outcome = manager.sign_in("maria@example.com", "Secreto1").await;
    assert!(outcome.error.is_none());
    assert!(outcome.session.is_some());
    assert!(manager.is_authenticated());

    let toasts = notifier.toasts.lock().unwrap();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].title, "Signed in successfully!");
}

#[tokio::test]
async fn test_sign_in_failure_surfaces_error_in_outcome() {
    let provider = ScriptedProvider::default();
    *provider.sign_in_response.lock().unwrap() = Some(Err(rejected("Invalid login credentials")));

    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = SessionManager::new(provider, notifier.clone(), Locale::En);

    let outcome = manager.sign_in("maria@example.com", "wrong").await;
    assert_eq!(outcome.error.as_deref(), Some("Invalid login credentials"));
    assert!(outcome.session.is_none());
    assert!(!manager.is_authenticated());

    let toasts = notifier.toasts.lock().unwrap();
    assert_eq!(toasts[0].kind, ToastKind::Error);
}

#[tokio::test]
async fn test_sign_up_with_immediate_session() {
    let provider = ScriptedProvider::default();
    *provider.sign_up_response.lock().unwrap() = Some(Ok(SignUpResponse {
        user: test_user(),
        session: Some(test_session()),
    }));

    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = SessionManager::new(provider, notifier, Locale::Es);

    let outcome = manager
        .sign_up("maria@example.com", "Secreto1", SignUpMetadata::default())
        .await;
    assert!(outcome.error.is_none());
    assert!(outcome.session.is_some());
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn test_sign_up_polls_for_deferred_session() {
    let provider = ScriptedProvider::default();
    *provider.sign_up_response.lock().unwrap() = Some(Ok(SignUpResponse {
        user: test_user(),
        session: None,
    }));
    // Session shows up on the first poll
    provider
        .poll_sessions
        .lock()
        .unwrap()
        .push_back(Some(test_session()));

    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = SessionManager::new(provider, notifier, Locale::Es);

    let outcome = manager
        .sign_up("maria@example.com", "Secreto1", SignUpMetadata::default())
        .await;
    assert!(outcome.session.is_some());
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn test_sign_out_transitions_to_anonymous() {
    let provider = ScriptedProvider::default();
    *provider.sign_in_response.lock().unwrap() = Some(Ok(test_session()));

    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = SessionManager::new(provider, notifier, Locale::Es);

    manager.sign_in("maria@example.com", "Secreto1").await;
    assert!(manager.is_authenticated());

    let error = manager.sign_out().await;
    assert!(error.is_none());
    assert_eq!(*manager.state(), AuthState::Anonymous);
}

#[test]
fn test_apply_session_mirrors_provider_events() {
    let provider = ScriptedProvider::default();
    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = SessionManager::new(provider, notifier, Locale::Es);

    let session = test_session();
    manager.apply_session(Some(&session));
    assert!(manager.is_authenticated());

    // External expiry reported by the provider
    manager.apply_session(None);
    assert_eq!(*manager.state(), AuthState::Anonymous);
}

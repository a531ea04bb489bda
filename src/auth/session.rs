//! Session manager wrapping the hosted auth provider
//!
//! Tracks the current session as a tri-state lifecycle and exposes the
//! three auth operations. Provider failures never escape an operation;
//! they come back inside the returned outcome, and user feedback goes
//! through the injected notifier.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::models::{AuthUser, Session, SignUpMetadata};
use super::provider::AuthProvider;
use crate::common::{safe_email_log, Locale, Notifier, Toast};

/// Local mirror of the provider's session state
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Provider has not reported yet
    Loading,
    Authenticated(AuthUser),
    Anonymous,
}

/// Result tuple of an auth operation: `(session|none, user|none, error|none)`
#[derive(Debug, Default)]
pub struct AuthOutcome {
    pub session: Option<Session>,
    pub user: Option<AuthUser>,
    pub error: Option<String>,
}

impl AuthOutcome {
    fn failure(message: String) -> Self {
        Self {
            session: None,
            user: None,
            error: Some(message),
        }
    }
}

/// Post-sign-up session polling: up to 3 retries with linear backoff
pub fn session_poll_delays() -> [Duration; 3] {
    [
        Duration::from_secs(1),
        Duration::from_secs(2),
        Duration::from_secs(3),
    ]
}

pub struct SessionManager<P: AuthProvider> {
    provider: P,
    state: AuthState,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
}

impl<P: AuthProvider> SessionManager<P> {
    pub fn new(provider: P, notifier: Arc<dyn Notifier>, locale: Locale) -> Self {
        Self {
            provider,
            state: AuthState::Loading,
            notifier,
            locale,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Provider change-event hook: adopt whatever session the provider
    /// now holds. `None` covers both sign-out and external expiry.
    pub fn apply_session(&mut self, session: Option<&Session>) {
        self.state = match session {
            Some(s) => AuthState::Authenticated(s.user.clone()),
            None => AuthState::Anonymous,
        };
    }

    /// Sign up a new customer, forwarding profile fields as metadata.
    ///
    /// When the provider requires email confirmation it issues no session
    /// up front; in that case the current session is polled up to 3 times
    /// with increasing delays before concluding there is none yet.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> AuthOutcome {
        let response = match self.provider.sign_up(email, password, &metadata).await {
            Ok(r) => r,
            Err(e) => return AuthOutcome::failure(e.to_string()),
        };

        let mut session = response.session;

        if session.is_none() {
            for delay in session_poll_delays() {
                tokio::time::sleep(delay).await;
                if let Some(current) = self.provider.current_session().await {
                    session = Some(current);
                    break;
                }
            }
        }

        match &session {
            Some(s) => {
                info!(
                    user_id = %s.user.id,
                    email = %safe_email_log(email),
                    "Sign-up produced an immediate session"
                );
                self.state = AuthState::Authenticated(s.user.clone());
            }
            None => {
                info!(
                    email = %safe_email_log(email),
                    "Sign-up accepted, awaiting email confirmation"
                );
            }
        }

        AuthOutcome {
            session,
            user: Some(response.user),
            error: None,
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> AuthOutcome {
        let messages = self.locale.messages();

        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                self.state = AuthState::Authenticated(session.user.clone());
                self.notifier.notify(Toast::success(messages.signin_success));
                info!(user_id = %session.user.id, "Customer signed in");
                AuthOutcome {
                    user: Some(session.user.clone()),
                    session: Some(session),
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(email = %safe_email_log(email), error = %message, "Sign-in failed");
                self.notifier.notify(Toast::error(message.clone()));
                AuthOutcome::failure(message)
            }
        }
    }

    pub async fn sign_out(&mut self) -> Option<String> {
        let messages = self.locale.messages();

        match self.provider.sign_out().await {
            Ok(()) => {
                self.state = AuthState::Anonymous;
                self.notifier
                    .notify(Toast::success(messages.signout_success));
                None
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Sign-out failed");
                self.notifier.notify(Toast::error(message.clone()));
                Some(message)
            }
        }
    }
}

// Auth module - session manager for the hosted auth provider plus the
// request extractor used by the bearer-protected API endpoints

pub mod extractors;
pub mod form;
pub mod models;
pub mod provider;
pub mod session;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::{
    AuthUser, AvatarFile, Claims, Session, SignInData, SignUpData, SignUpMetadata, UserMetadata,
};
pub use provider::{AuthProvider, HostedAuthClient, ProviderError};
pub use session::{AuthOutcome, AuthState, SessionManager};

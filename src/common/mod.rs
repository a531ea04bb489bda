// Common module - shared types and utilities across all modules

pub mod error;
pub mod helpers;
pub mod i18n;
pub mod id_generator;
pub mod migrations;
pub mod notify;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{email_local_part, safe_email_log};
pub use i18n::Locale;
pub use id_generator::*;
pub use notify::{Notifier, Toast, ToastKind, TracingNotifier};
pub use state::AppState;
pub use validation::{ValidationError, ValidationResult, Validator};

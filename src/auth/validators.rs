// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::{SignInData, SignUpData};
use crate::common::{ValidationResult, Validator};

/// 5 MiB ceiling for sign-up avatars
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Image content types accepted for avatars (jpg accepted as jpeg alias)
pub const ALLOWED_AVATAR_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

// Loose international phone shape; digit-count bounds are enforced
// separately on the normalized (digits-only) form
fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\+?\(?[0-9]{1,4}\)?[-\s\.]?\(?[0-9]{1,4}\)?[-\s\.]?[0-9]{1,9}$").unwrap()
    })
}

fn full_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").unwrap())
}

/// Digits-only normalization used for phone length bounds
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn validate_email(result: &mut ValidationResult, email: &str) {
    if email.is_empty() {
        result.add_error("email", "Email is required");
    } else if !email_regex().is_match(email) {
        result.add_error("email", "Invalid email address");
    }
}

pub struct SignInValidator;

impl Validator<SignInData> for SignInValidator {
    fn validate(&self, data: &SignInData) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_email(&mut result, &data.email);

        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        } else if data.password.chars().count() < 6 {
            result.add_error("password", "Password must be at least 6 characters");
        }

        result
    }
}

pub struct SignUpValidator;

impl Validator<SignUpData> for SignUpValidator {
    fn validate(&self, data: &SignUpData) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Full name: [2,100] chars, letters/spaces/Latin accents only
        let name_len = data.full_name.chars().count();
        if data.full_name.is_empty() {
            result.add_error("fullName", "Full name is required");
        } else if name_len < 2 {
            result.add_error("fullName", "Full name must be at least 2 characters");
        } else if name_len > 100 {
            result.add_error("fullName", "Full name must be less than 100 characters");
        } else if !full_name_regex().is_match(&data.full_name) {
            result.add_error("fullName", "Full name can only contain letters and spaces");
        }

        validate_email(&mut result, &data.email);

        // Phone: shape first, then digit-count bounds on the normalized form
        if data.phone.is_empty() {
            result.add_error("phone", "Phone number is required");
        } else if !phone_regex().is_match(&data.phone) {
            result.add_error("phone", "Invalid phone number format");
        } else {
            let digits = phone_digits(&data.phone);
            if digits.len() < 10 {
                result.add_error("phone", "Phone number must have at least 10 digits");
            } else if digits.len() > 15 {
                result.add_error("phone", "Phone number must have at most 15 digits");
            }
        }

        // Password: [6,100] chars with upper, lower, and digit classes
        let password_len = data.password.chars().count();
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        } else if password_len < 6 {
            result.add_error("password", "Password must be at least 6 characters");
        } else if password_len > 100 {
            result.add_error("password", "Password must be less than 100 characters");
        } else if !data.password.chars().any(|c| c.is_ascii_uppercase()) {
            result.add_error(
                "password",
                "Password must contain at least one uppercase letter",
            );
        } else if !data.password.chars().any(|c| c.is_ascii_lowercase()) {
            result.add_error(
                "password",
                "Password must contain at least one lowercase letter",
            );
        } else if !data.password.chars().any(|c| c.is_ascii_digit()) {
            result.add_error("password", "Password must contain at least one number");
        }

        // Cross-field match always reports on confirmPassword, not password
        if data.confirm_password.is_empty() {
            result.add_error("confirmPassword", "Please confirm your password");
        } else if data.confirm_password != data.password {
            result.add_error("confirmPassword", "Passwords don't match");
        }

        // Avatar is optional; when present it must be a small image
        if let Some(avatar) = &data.avatar {
            if avatar.size() > MAX_AVATAR_BYTES {
                result.add_error("avatar", "Image size must be less than 5MB");
            } else if !ALLOWED_AVATAR_TYPES.contains(&avatar.content_type.as_str()) {
                result.add_error("avatar", "Image must be JPEG, PNG, or WebP");
            }
        }

        result
    }
}

//! Sign-up form state with explicit revalidation dependencies
//!
//! Fields re-validate as the customer edits, but only once a field has
//! been touched, and editing one field may invalidate another: the
//! password pair checks each other. The dependency edges are written out
//! as a table instead of re-running the whole schema reactively.

use std::collections::{HashMap, HashSet};

use super::models::{AvatarFile, SignUpData};
use super::validators::SignUpValidator;
use crate::common::{ValidationResult, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    FullName,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    Avatar,
}

impl FieldId {
    /// Error path as surfaced to the UI (matches validator field names)
    pub fn path(&self) -> &'static str {
        match self {
            FieldId::FullName => "fullName",
            FieldId::Email => "email",
            FieldId::Phone => "phone",
            FieldId::Password => "password",
            FieldId::ConfirmPassword => "confirmPassword",
            FieldId::Avatar => "avatar",
        }
    }

    /// Fields whose validation state depends on this one.
    /// The password pair is mutually dependent; everything else only
    /// invalidates itself.
    pub fn dependents(&self) -> &'static [FieldId] {
        match self {
            FieldId::Password => &[FieldId::Password, FieldId::ConfirmPassword],
            FieldId::ConfirmPassword => &[FieldId::ConfirmPassword, FieldId::Password],
            FieldId::FullName => &[FieldId::FullName],
            FieldId::Email => &[FieldId::Email],
            FieldId::Phone => &[FieldId::Phone],
            FieldId::Avatar => &[FieldId::Avatar],
        }
    }

    const ALL: [FieldId; 6] = [
        FieldId::FullName,
        FieldId::Email,
        FieldId::Phone,
        FieldId::Password,
        FieldId::ConfirmPassword,
        FieldId::Avatar,
    ];
}

#[derive(Debug, Default)]
pub struct SignUpForm {
    data: SignUpData,
    touched: HashSet<FieldId>,
    errors: HashMap<FieldId, String>,
}

impl SignUpForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &SignUpData {
        &self.data
    }

    pub fn error(&self, field: FieldId) -> Option<&str> {
        self.errors.get(&field).map(|s| s.as_str())
    }

    pub fn is_touched(&self, field: FieldId) -> bool {
        self.touched.contains(&field)
    }

    /// Blur handler: mark the field touched and validate it
    pub fn touch(&mut self, field: FieldId) {
        self.touched.insert(field);
        self.recompute(&[field]);
    }

    pub fn set_full_name(&mut self, value: String) {
        self.data.full_name = value;
        self.field_changed(FieldId::FullName);
    }

    pub fn set_email(&mut self, value: String) {
        self.data.email = value;
        self.field_changed(FieldId::Email);
    }

    pub fn set_phone(&mut self, value: String) {
        self.data.phone = value;
        self.field_changed(FieldId::Phone);
    }

    pub fn set_password(&mut self, value: String) {
        self.data.password = value;
        self.field_changed(FieldId::Password);
    }

    pub fn set_confirm_password(&mut self, value: String) {
        self.data.confirm_password = value;
        self.field_changed(FieldId::ConfirmPassword);
    }

    pub fn set_avatar(&mut self, value: Option<AvatarFile>) {
        self.data.avatar = value;
        self.field_changed(FieldId::Avatar);
    }

    /// Submit-time validation: touches everything and records all errors
    pub fn validate_all(&mut self) -> ValidationResult {
        self.touched.extend(FieldId::ALL);
        self.recompute(&FieldId::ALL);

        SignUpValidator.validate(&self.data)
    }

    /// Recompute errors for the touched fields among `fields`
    fn field_changed(&mut self, field: FieldId) {
        let dependents: Vec<FieldId> = field
            .dependents()
            .iter()
            .copied()
            .filter(|d| self.touched.contains(d))
            .collect();
        self.recompute(&dependents);
    }

    fn recompute(&mut self, fields: &[FieldId]) {
        if fields.is_empty() {
            return;
        }

        let result = SignUpValidator.validate(&self.data);
        for field in fields {
            match result.error_for(field.path()) {
                Some(message) => {
                    self.errors.insert(*field, message.to_string());
                }
                None => {
                    self.errors.remove(field);
                }
            }
        }
    }
}

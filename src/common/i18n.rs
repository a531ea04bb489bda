// Localized user-facing strings
//
// The studio's site is Spanish-first with an English fallback; every
// notification the controllers emit goes through one of these tables.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Parse a locale tag such as "es" or "en-US"; unknown tags fall back
    /// to Spanish, matching the site's default
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.split('-').next().unwrap_or(t)) {
            Some("en") => Locale::En,
            _ => Locale::Es,
        }
    }

    pub fn messages(&self) -> &'static Messages {
        match self {
            Locale::Es => &ES,
            Locale::En => &EN,
        }
    }
}

pub struct Messages {
    pub signin_success: &'static str,
    pub signin_error: &'static str,
    pub signout_success: &'static str,
    pub signout_error: &'static str,
    pub signup_error: &'static str,
    pub signup_success: &'static str,
    pub signup_check_email: &'static str,
    pub signup_profile_failed: &'static str,
    pub profile_verify_warning: &'static str,
    pub review_inserted: &'static str,
    pub review_error: &'static str,
    pub auth_required: &'static str,
}

static ES: Messages = Messages {
    signin_success: "¡Sesión iniciada correctamente!",
    signin_error: "Error al iniciar sesión",
    signout_success: "¡Sesión cerrada correctamente!",
    signout_error: "Error al cerrar sesión",
    signup_error: "Error al crear la cuenta",
    signup_success: "¡Cuenta creada correctamente!",
    signup_check_email: "Revisa tu correo para confirmar tu cuenta",
    signup_profile_failed:
        "La cuenta fue creada pero el perfil no pudo guardarse. Contacta a soporte.",
    profile_verify_warning: "Advertencia: es posible que el perfil no se haya guardado.",
    review_inserted: "¡Reseña publicada correctamente!",
    review_error: "Error al enviar la reseña",
    auth_required: "Inicia sesión para publicar una reseña",
};

static EN: Messages = Messages {
    signin_success: "Signed in successfully!",
    signin_error: "Error signing in",
    signout_success: "Signed out successfully!",
    signout_error: "Error signing out",
    signup_error: "Error signing up",
    signup_success: "Account created successfully!",
    signup_check_email: "Please check your email to confirm your account",
    signup_profile_failed:
        "Account created but profile could not be saved. Please contact support.",
    profile_verify_warning: "Warning: Profile may not have been saved correctly.",
    review_inserted: "Review submitted successfully!",
    review_error: "Error sending review",
    auth_required: "Please sign in to submit a review",
};

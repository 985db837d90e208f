//! Client-side form validation, run before anything is submitted to the
//! backend. Mirrors the rules the backend enforces so most rejections are
//! caught with inline messages instead of a round trip.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// A validation message attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl SignupForm {
    /// All field errors at once, so the form can annotate every field in a
    /// single pass rather than stopping at the first problem.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.username.len() < 3 {
            errors.push(FieldError::new(
                "username",
                "Username must be at least 3 characters",
            ));
        } else if self.username.len() > 150 {
            errors.push(FieldError::new(
                "username",
                "Username must be at most 150 characters",
            ));
        } else if !USERNAME_RE.is_match(&self.username) {
            errors.push(FieldError::new(
                "username",
                "Username may only contain letters, digits and underscores",
            ));
        }

        if !EMAIL_RE.is_match(&self.email) {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }

        if self.password.len() < 8 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 8 characters",
            ));
        } else if !password_has_letter_and_digit(&self.password) {
            errors.push(FieldError::new(
                "password",
                "Password must contain both letters and digits",
            ));
        }

        if self.password != self.password2 {
            errors.push(FieldError::new("password2", "Passwords do not match"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn password_has_letter_and_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

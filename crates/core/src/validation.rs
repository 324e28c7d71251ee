//! Client-side form validation
//!
//! These checks run before any network call. The backend applies its own,
//! stricter password composition rule; the client only enforces the minimum
//! length so obviously short inputs never leave the form.

use crate::error::{CoreError, CoreResult};

/// Minimum password length accepted by the forms
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate that a required field carries a non-blank value
pub fn validate_required(value: &str, field: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, format!("{} is required", label(field))));
    }
    Ok(())
}

/// Validate an email address shape: one `@`, a non-empty local part and a
/// dotted domain.
pub fn validate_email(email: &str) -> CoreResult<()> {
    validate_required(email, "email")?;
    let email = email.trim();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !email.contains(char::is_whitespace)
    });
    if !valid {
        return Err(CoreError::validation(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

/// Validate a password against the minimum length, counted in characters
pub fn validate_password(password: &str) -> CoreResult<()> {
    validate_required(password, "password")?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn label(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.map(|c| if c == '_' { ' ' } else { c })).collect()
    })
}

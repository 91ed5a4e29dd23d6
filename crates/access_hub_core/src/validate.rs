//! crates/access_hub_core/src/validate.rs
//!
//! Credential validation helpers shared by the sign-up and sign-in forms.

/// Allowed special characters in passwords.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// RFC-light email check: one `@`, no whitespace, and a dot in the domain
/// with at least one character on either side.
pub fn validate_email(email: &str) -> bool {
    let mut parts = email.splitn(3, '@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rfind('.') {
        Some(idx) => idx > 0 && idx < domain.len() - 1,
        None => false,
    }
}

/// Password policy: at least 8 characters, at least one digit, at least one
/// symbol from [`PASSWORD_SYMBOLS`], and nothing outside ASCII alphanumerics
/// plus that symbol set.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
}

/// Lists exactly the password rules the given input violates, in the order
/// the sign-up form renders them.
pub fn password_errors(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();
    if password.chars().count() < 8 {
        errors.push("At least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("At least one number");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push("At least one special character (!@#$%^&*)");
    }
    errors
}

//! Credential validation rules.
//!
//! Both rules are pure and total over any input string. Matching is ASCII
//! only and does not depend on locale.

use std::sync::LazyLock;

use regex::Regex;

/// Message shown under the email field when the input does not match.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email";

/// Message shown under the password field when the input is too short.
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";

/// Minimum password length, counted in Unicode scalar values.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Local part of ASCII alphanumerics plus `+_.-`, domain of alphanumerics
/// plus `.-`. No TLD rules.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("email pattern is a valid regex")
});

/// Returns true if the whole string matches the email pattern.
pub fn is_email_valid(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Returns true if the password is at least [`MIN_PASSWORD_LEN`] characters.
pub fn is_password_valid(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Field error for an email input. Empty input never carries an error.
pub fn email_error(email: &str) -> Option<&'static str> {
    (!email.is_empty() && !is_email_valid(email)).then_some(INVALID_EMAIL_MESSAGE)
}

/// Field error for a password input. Empty input never carries an error.
pub fn password_error(password: &str) -> Option<&'static str> {
    (!password.is_empty() && !is_password_valid(password)).then_some(SHORT_PASSWORD_MESSAGE)
}

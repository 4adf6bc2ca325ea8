//! Field checks for the signup wizard. Messages are shown to the user as-is.

use crate::auth::AuthError;

/// Personal mailbox providers that cannot be used to sign up.
pub const DENIED_EMAIL_DOMAINS: [&str; 8] = [
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "mail.com",
    "protonmail.com",
    "zoho.com",
];

pub const MIN_PHONE_LENGTH: usize = 10;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Step-1 check: present, contains `@`, and not a personal domain.
///
/// # Errors
/// Returns `AuthError::Validation` describing the first failed rule.
pub fn validate_work_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("Work email is required".to_string()));
    }

    let Some((_, domain)) = email.split_once('@') else {
        return Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    };

    let domain = domain.to_lowercase();
    if DENIED_EMAIL_DOMAINS.contains(&domain.as_str()) {
        return Err(AuthError::Validation(
            "Please use your work email address. Personal email domains are not accepted."
                .to_string(),
        ));
    }

    Ok(())
}

/// Keeps `+` and ASCII digits.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| *c == '+' || c.is_ascii_digit())
        .collect()
}

#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    normalize_phone(phone).len() >= MIN_PHONE_LENGTH
}

/// Country value stored with the draft: the first whitespace-separated token
/// of the phone number without its `+`.
#[must_use]
pub fn country_from_phone(phone: &str) -> Option<String> {
    phone
        .split_whitespace()
        .next()
        .map(|token| token.replace('+', ""))
        .filter(|country| !country.is_empty())
}

/// Password strength indicators. Advisory: none of them blocks submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PasswordChecks {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordChecks {
    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)),
        }
    }

    /// Number of satisfied checks, 0 to 5.
    #[must_use]
    pub fn score(&self) -> usize {
        [
            self.length,
            self.uppercase,
            self.lowercase,
            self.digit,
            self.special,
        ]
        .into_iter()
        .filter(|passed| *passed)
        .count()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.score() == 5
    }
}

//! Password login. Credentials are checked locally for shape, then posted;
//! the backend answers with a user id and emails an OTP. Nothing is persisted
//! until that OTP is verified.
//!
//! Flow Overview: validate form, post credentials, map refusal statuses to
//! messages, and open either the login OTP challenge or, for unverified
//! accounts, an email confirmation challenge after re-sending the code.

use crate::{
    api::{ApiClient, AppError},
    auth::{
        client,
        error::{AuthError, CONNECTION_MESSAGE},
        otp::{ChallengeContext, OtpChallenge},
        session::SessionContext,
    },
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::OnceLock;
use tracing::{info, instrument, warn};

/// Minimum password length accepted by the login form.
pub const MIN_LOGIN_PASSWORD_LENGTH: usize = 6;

static LOGIN_EMAIL: OnceLock<Option<Regex>> = OnceLock::new();

/// Backend `error` value for accounts whose email is not confirmed yet.
const EMAIL_NOT_VERIFIED: &str = "Email not verified";

#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials accepted; a login code was sent.
    OtpRequired(OtpChallenge),
    /// Account exists but its email is unconfirmed; a confirmation code was sent.
    EmailVerificationRequired {
        challenge: OtpChallenge,
        notice: &'static str,
    },
}

/// Field-level checks of the login form.
///
/// # Errors
/// Returns `AuthError::Validation` with the first failing field's message.
pub fn validate_login_form(email: &str, password: &SecretString) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    if !valid_login_email(email) {
        return Err(AuthError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }

    let password = password.expose_secret();
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    if password.chars().count() < MIN_LOGIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_LOGIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

fn valid_login_email(email: &str) -> bool {
    LOGIN_EMAIL
        .get_or_init(|| Regex::new(r"\S+@\S+\.\S+").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(email))
}

#[derive(Clone, Debug)]
pub struct LoginFlow {
    api: ApiClient,
    session: SessionContext,
}

impl LoginFlow {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionContext) -> Self {
        Self { api, session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Posts credentials and opens the follow-up challenge.
    ///
    /// # Errors
    /// Returns a validation error for malformed input, an authentication error
    /// for refused credentials, or a transport error when the server is unreachable.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, AuthError> {
        validate_login_form(email, password)?;
        let email = email.trim();

        match client::login(&self.api, email, password.expose_secret()).await {
            Ok(user) => {
                info!("credentials accepted, awaiting login code");
                Ok(LoginOutcome::OtpRequired(OtpChallenge::open(
                    user.id,
                    ChallengeContext::Login,
                )))
            }
            Err(err) => {
                self.clear_session();

                if is_unverified_email(&err) {
                    warn!("login refused: email not verified");
                    return self.resend_verification(email).await;
                }

                Err(login_error(err))
            }
        }
    }

    /// Corrective action for unverified accounts: send the code and open the
    /// confirmation challenge.
    async fn resend_verification(&self, email: &str) -> Result<LoginOutcome, AuthError> {
        client::send_confirm_email(&self.api, email)
            .await
            .map_err(|_| {
                AuthError::Authentication(
                    "Failed to send verification email. Please try again.".to_string(),
                )
            })?;

        Ok(LoginOutcome::EmailVerificationRequired {
            challenge: OtpChallenge::open(email, ChallengeContext::LoginEmailConfirmation),
            notice: "Please verify your email address before logging in. Verification email sent! Please check your inbox.",
        })
    }

    fn clear_session(&self) {
        if let Err(err) = self.session.clear() {
            warn!("Failed to clear session: {}", err);
        }
    }
}

fn is_unverified_email(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Http { status: 403, code: Some(code), .. } if code == EMAIL_NOT_VERIFIED
    )
}

/// Maps a refused login to the message shown on the form.
fn login_error(err: AppError) -> AuthError {
    match err {
        AppError::Http { status: 404, .. } => AuthError::Authentication(
            "Email address not found. Please check and try again.".to_string(),
        ),
        AppError::Http { status: 401, .. } => {
            AuthError::Authentication("Incorrect password. Please try again.".to_string())
        }
        AppError::Http {
            code: Some(code), ..
        } => AuthError::Authentication(code),
        AppError::Http { .. } => {
            AuthError::Authentication("Login failed. Please try again.".to_string())
        }
        _ => AuthError::Transport(CONNECTION_MESSAGE.to_string()),
    }
}

//! One-time-code challenge shared by every call site: password login, Google
//! login, signup email confirmation and the "email not verified" detour of
//! the login page. The code itself is never checked locally; the backend
//! decides and limits attempts.

use crate::{
    api::ApiClient,
    auth::{
        client,
        error::AuthError,
        navigation::{
            Navigation, Route, ERROR_REDIRECT_DELAY, GOOGLE_SUCCESS_DELAY, LOGIN_SUCCESS_DELAY,
        },
        session::{Session, SessionContext},
    },
};
use serde_json::{Map, Value};
use std::{fmt, time::Duration};
use tracing::{info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeContext {
    /// Second factor after a password check.
    Login,
    /// Second factor after a Google code exchange.
    Google,
    /// Email ownership proof during signup.
    SignupEmail,
    /// Email ownership proof after a login was refused as unverified.
    LoginEmailConfirmation,
}

/// What happens to the challenge when a submission fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    KeepOpen,
    CloseAndRedirect(Duration),
}

impl ChallengeContext {
    #[must_use]
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            ChallengeContext::Google => FailurePolicy::CloseAndRedirect(ERROR_REDIRECT_DELAY),
            ChallengeContext::Login
            | ChallengeContext::SignupEmail
            | ChallengeContext::LoginEmailConfirmation => FailurePolicy::KeepOpen,
        }
    }

    /// Whether the pending identifier is a user id (token flows) or an email.
    #[must_use]
    pub fn yields_tokens(self) -> bool {
        matches!(self, ChallengeContext::Login | ChallengeContext::Google)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ChallengeContext::Login | ChallengeContext::Google => "Enter verification code",
            ChallengeContext::SignupEmail | ChallengeContext::LoginEmailConfirmation => {
                "Verify Your Email"
            }
        }
    }

    /// Message used when the backend rejects a code without saying why.
    #[must_use]
    pub fn rejection_fallback(self) -> &'static str {
        match self {
            ChallengeContext::Login => "Invalid OTP. Please try again.",
            ChallengeContext::Google
            | ChallengeContext::SignupEmail
            | ChallengeContext::LoginEmailConfirmation => "Invalid verification code",
        }
    }
}

/// Token pair and profile returned by a verified login OTP.
#[derive(Clone)]
pub struct VerifiedLogin {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Map<String, Value>,
}

impl fmt::Debug for VerifiedLogin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("VerifiedLogin")
            .field("user_fields", &self.user.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum OtpOutcome {
    Tokens(VerifiedLogin),
    EmailVerified,
}

/// Result of a completed challenge as seen by the user.
#[derive(Debug)]
pub struct Completion {
    pub notice: &'static str,
    pub navigation: Option<Navigation>,
    pub session: Option<Session>,
}

/// A failed submission, with the redirect the call site asked for (if any).
#[derive(Debug)]
pub struct OtpFailure {
    pub error: AuthError,
    pub navigation: Option<Navigation>,
}

impl fmt::Display for OtpFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(formatter)
    }
}

impl std::error::Error for OtpFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[derive(Debug)]
pub struct OtpChallenge {
    subject: String,
    context: ChallengeContext,
    open: bool,
    /// Profile hint from the Google exchange, used if the OTP response omits the user.
    fallback_user: Option<Map<String, Value>>,
}

impl OtpChallenge {
    /// Opens a challenge for a user id (token contexts) or an email address.
    #[must_use]
    pub fn open(subject: impl Into<String>, context: ChallengeContext) -> Self {
        Self {
            subject: subject.into(),
            context,
            open: true,
            fallback_user: None,
        }
    }

    #[must_use]
    pub fn with_fallback_user(mut self, user: Option<Map<String, Value>>) -> Self {
        self.fallback_user = user;
        self
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn context(&self) -> ChallengeContext {
        self.context
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Dismisses the challenge without submitting.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Submits a code. `&mut self` allows a single outstanding submission.
    ///
    /// # Errors
    /// Returns `OtpFailure` when the challenge is closed, the backend rejects the
    /// code, or the response lacks the token pair.
    #[instrument(skip(self, api, code), fields(context = ?self.context))]
    pub async fn submit(&mut self, api: &ApiClient, code: &str) -> Result<OtpOutcome, OtpFailure> {
        if !self.open {
            return Err(OtpFailure {
                error: AuthError::Validation("Verification is no longer pending".to_string()),
                navigation: None,
            });
        }

        let result = if self.context.yields_tokens() {
            self.verify_login(api, code).await.map(OtpOutcome::Tokens)
        } else {
            client::confirm_email(api, &self.subject, code)
                .await
                .map(|()| OtpOutcome::EmailVerified)
                .map_err(|err| AuthError::from_api(err, self.context.rejection_fallback()))
        };

        match result {
            Ok(outcome) => {
                info!("verification code accepted");
                self.open = false;
                Ok(outcome)
            }
            Err(error) => {
                warn!("verification failed: {}", error);
                let navigation = match self.context.failure_policy() {
                    FailurePolicy::KeepOpen => None,
                    FailurePolicy::CloseAndRedirect(delay) => {
                        self.open = false;
                        Some(Navigation::after(Route::Login, delay))
                    }
                };
                Err(OtpFailure { error, navigation })
            }
        }
    }

    /// Submits a code and applies the call site's success handling: token
    /// contexts replace the session and head to the dashboard, email contexts
    /// only report the confirmation. Failures in token contexts clear any
    /// session left behind.
    ///
    /// # Errors
    /// Returns `OtpFailure` when submission fails or the session cannot be stored.
    pub async fn complete(
        &mut self,
        api: &ApiClient,
        session: &SessionContext,
        code: &str,
    ) -> Result<Completion, OtpFailure> {
        let outcome = match self.submit(api, code).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                if self.context.yields_tokens() {
                    if let Err(err) = session.clear() {
                        warn!("Failed to clear session after verification failure: {}", err);
                    }
                }
                return Err(failure);
            }
        };

        match (self.context, outcome) {
            (ChallengeContext::Login | ChallengeContext::Google, OtpOutcome::Tokens(login)) => {
                let mut established = Session::from_verified_login(
                    login.access_token,
                    login.refresh_token,
                    login.user,
                );
                // token contexts are keyed by user id
                if established.user_id.is_none() {
                    established.user_id = Some(self.subject.clone());
                }
                session.replace(established.clone()).map_err(|err| OtpFailure {
                    error: AuthError::Storage(err),
                    navigation: None,
                })?;

                let (notice, delay) = if self.context == ChallengeContext::Google {
                    (
                        "Successfully authenticated! Redirecting to dashboard...",
                        GOOGLE_SUCCESS_DELAY,
                    )
                } else {
                    (
                        "Login successful! Redirecting to dashboard...",
                        LOGIN_SUCCESS_DELAY,
                    )
                };

                Ok(Completion {
                    notice,
                    navigation: Some(Navigation::after(Route::Dashboard, delay)),
                    session: Some(established),
                })
            }
            (ChallengeContext::LoginEmailConfirmation, _) => Ok(Completion {
                notice: "Email verified successfully! Please log in again.",
                navigation: Some(Navigation::now(Route::Login)),
                session: None,
            }),
            (_, _) => Ok(Completion {
                notice: "Email verified successfully!",
                navigation: None,
                session: None,
            }),
        }
    }

    async fn verify_login(&self, api: &ApiClient, code: &str) -> Result<VerifiedLogin, AuthError> {
        let data = client::verify_otp_login(api, &self.subject, code)
            .await
            .map_err(|err| AuthError::from_api(err, self.context.rejection_fallback()))?;

        let (Some(access_token), Some(refresh_token)) = (data.access_token, data.refresh_token)
        else {
            return Err(AuthError::Transport(
                "Invalid authentication response".to_string(),
            ));
        };

        let user = data
            .user
            .or_else(|| self.fallback_user.clone())
            .unwrap_or_default();

        Ok(VerifiedLogin {
            access_token,
            refresh_token,
            user,
        })
    }
}

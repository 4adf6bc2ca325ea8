//! Google sign-in through the backend's redirect endpoints.
//!
//! Flow Overview:
//! 1) `begin` stores a fresh nonce in session-scoped storage and returns the
//!    provider initiation URL carrying it as `state`.
//! 2) The provider redirects back with `code` and `state` (or `error`).
//! 3) `complete` takes the stored nonce (it is deleted whatever happens next),
//!    checks the returned values, and only then exchanges the code.
//! 4) New users continue to signup with their email prefilled; existing users
//!    get a Google OTP challenge.
//!
//! Security boundaries:
//! - The nonce is single use and compared for exact equality.
//! - Integrity failures never reach the exchange endpoint.

use crate::{
    api::ApiClient,
    auth::{
        client,
        error::{AuthError, OAuthError},
        navigation::{Navigation, Route},
        otp::{ChallengeContext, OtpChallenge},
    },
    storage::Storage,
};
use rand::{distributions::Alphanumeric, Rng};
use std::{fmt, sync::Arc};
use tracing::{info, instrument, warn};
use url::Url;

/// Session-scoped storage key for the pending nonce.
pub const OAUTH_STATE_KEY: &str = "googleOAuthState";

pub const NONCE_LENGTH: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthPhase {
    Idle,
    AwaitingProviderRedirect,
    Returned,
    ExchangingCode,
    NewUserSignup,
    OtpChallenge,
    SessionEstablished,
    Failed,
}

/// Query values the provider appended to the redirect URL.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Reads `code`, `state` and `error` from a redirect URL. Values are
    /// percent-decoded; empty values count as absent.
    ///
    /// # Errors
    /// Returns an error if `url` is not an absolute URL.
    pub fn from_url(url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url)?;
        Ok(Self::from_pairs(url.query_pairs()))
    }

    /// Same as [`CallbackParams::from_url`] for a bare query string.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(
            query.trim_start_matches('?').as_bytes(),
        ))
    }

    fn from_pairs<'a>(
        pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    ) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

impl fmt::Debug for CallbackParams {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CallbackParams")
            .field("code", &self.code.as_ref().map(|_| "[redacted]"))
            .field("state", &self.state.as_ref().map(|_| "[redacted]"))
            .field("error", &self.error)
            .finish()
    }
}

/// Where the user goes after a successful code exchange.
#[derive(Debug)]
pub enum OAuthReturn {
    /// Unknown account: continue to signup with the provider-verified email.
    NewUser { email: String, navigation: Navigation },
    /// Known account: a login code was emailed and must be confirmed.
    OtpRequired(OtpChallenge),
}

/// A fatal handshake failure and the redirect that follows it.
#[derive(Debug)]
pub struct OAuthFailure {
    pub error: AuthError,
    pub navigation: Navigation,
}

impl fmt::Display for OAuthFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(formatter)
    }
}

impl std::error::Error for OAuthFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<AuthError> for OAuthFailure {
    fn from(error: AuthError) -> Self {
        Self {
            error,
            navigation: Navigation::error_to_login(),
        }
    }
}

impl From<OAuthError> for OAuthFailure {
    fn from(error: OAuthError) -> Self {
        AuthError::OAuth(error).into()
    }
}

pub struct OAuthHandshake {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    phase: OAuthPhase,
}

impl OAuthHandshake {
    /// `storage` is the session-scoped store; it must outlive the redirect.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        Self {
            api,
            storage,
            phase: OAuthPhase::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> OAuthPhase {
        self.phase
    }

    /// Stores a new nonce, replacing any pending one, and returns the URL the
    /// user agent must open.
    ///
    /// # Errors
    /// Returns an error if the nonce cannot be stored or the API base URL is invalid.
    #[instrument(skip(self))]
    pub fn begin(&mut self) -> Result<Url, AuthError> {
        let nonce = generate_nonce();
        self.storage.set(OAUTH_STATE_KEY, &nonce)?;

        let url = self
            .api
            .config()
            .google_login_url(&nonce)
            .map_err(|err| AuthError::Transport(format!("Invalid API base URL: {err}")))?;

        self.phase = OAuthPhase::AwaitingProviderRedirect;
        info!("redirecting to identity provider");
        Ok(url)
    }

    /// Validates the provider's return and exchanges the code.
    ///
    /// # Errors
    /// Returns `OAuthFailure` (always with a delayed redirect to login) on a
    /// provider error, missing or mismatched values, a failed exchange, or an
    /// exchange response without an email.
    #[instrument(skip_all)]
    pub async fn complete(&mut self, params: &CallbackParams) -> Result<OAuthReturn, OAuthFailure> {
        self.phase = OAuthPhase::Returned;
        let result = self.exchange(params).await;
        self.phase = match &result {
            Ok(OAuthReturn::NewUser { .. }) => OAuthPhase::NewUserSignup,
            Ok(OAuthReturn::OtpRequired(_)) => OAuthPhase::OtpChallenge,
            Err(failure) => {
                warn!("google sign-in failed: {}", failure);
                OAuthPhase::Failed
            }
        };
        result
    }

    /// Records that the Google OTP challenge established a session.
    pub fn mark_session_established(&mut self) {
        if self.phase == OAuthPhase::OtpChallenge {
            self.phase = OAuthPhase::SessionEstablished;
        }
    }

    /// Drops any pending nonce.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    pub fn abandon(&mut self) -> Result<(), AuthError> {
        self.storage.remove(OAUTH_STATE_KEY)?;
        self.phase = OAuthPhase::Idle;
        Ok(())
    }

    async fn exchange(&mut self, params: &CallbackParams) -> Result<OAuthReturn, OAuthFailure> {
        // Single use: consumed before any check.
        let stored = self.storage.take(OAUTH_STATE_KEY).map_err(AuthError::from)?;

        if let Some(error) = &params.error {
            return Err(OAuthError::Provider(error.clone()).into());
        }
        let code = params.code.as_deref().ok_or(OAuthError::MissingCode)?;
        let state = params.state.as_deref().ok_or(OAuthError::MissingState)?;
        if stored.as_deref() != Some(state) {
            return Err(OAuthError::StateMismatch.into());
        }

        self.phase = OAuthPhase::ExchangingCode;
        let response = client::google_callback(&self.api, code, state)
            .await
            .map_err(|err| match AuthError::from_api(err, "Failed to authenticate") {
                AuthError::Authentication(message) => {
                    AuthError::OAuth(OAuthError::Exchange(message))
                }
                other => other,
            })?;

        let email = response
            .email
            .filter(|email| !email.is_empty())
            .ok_or(OAuthError::InvalidResponse)?;

        if response.is_new_user {
            info!("new google account, continuing to signup");
            return Ok(OAuthReturn::NewUser {
                navigation: Navigation::now(Route::Signup {
                    email: Some(email.clone()),
                }),
                email,
            });
        }

        let user_id = response.user_id.ok_or(OAuthError::InvalidResponse)?;
        info!("existing google account, awaiting login code");
        Ok(OAuthReturn::OtpRequired(
            OtpChallenge::open(user_id, ChallengeContext::Google)
                .with_fallback_user(response.initial_auth_data),
        ))
    }
}

impl fmt::Debug for OAuthHandshake {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OAuthHandshake")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

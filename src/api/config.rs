//! Backend and frontend base URLs plus the fixed endpoint paths derived from
//! them. Values come from defaults and optional overrides (CLI flags or their
//! environment variables). Configuration values are public; do not store
//! secrets here.

use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://app.spiralreports.com";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Path the identity provider redirects back to on the frontend.
pub const GOOGLE_REDIRECT_PATH: &str = "/oauth/google/callback";

pub const LOGIN_PATH: &str = "/api/auth/user/login";
pub const VERIFY_OTP_LOGIN_PATH: &str = "/api/auth/verify-otp-login";
pub const SEND_CONFIRM_EMAIL_PATH: &str = "/api/users/send-confirm-email";
pub const CONFIRM_EMAIL_PATH: &str = "/api/users/confirm-email";
pub const SIGNUP_PATH: &str = "/api/users/signup";
pub const GOOGLE_LOGIN_PATH: &str = "/api/auth/user/login/google";
pub const GOOGLE_CALLBACK_PATH: &str = "/api/auth/oauth/google";
pub const REFRESH_TOKEN_PATH: &str = "/api/auth/refresh-token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub frontend_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub frontend_url: Option<String>,
}

impl AppConfig {
    /// Defaults with any non-empty overrides applied.
    #[must_use]
    pub fn load(overrides: ConfigOverrides) -> Self {
        let mut config = Self::default();
        apply_overrides(&mut config, overrides);
        config
    }

    /// Absolute URL for a backend path.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        build_url_with_base(&self.api_base_url, path)
    }

    #[must_use]
    pub fn google_redirect_uri(&self) -> String {
        build_url_with_base(&self.frontend_url, GOOGLE_REDIRECT_PATH)
    }

    /// Provider redirect initiation URL carrying the OAuth state nonce.
    ///
    /// # Errors
    /// Returns an error if the configured API base URL is not a valid URL.
    pub fn google_login_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.api_url(GOOGLE_LOGIN_PATH))?;
        url.query_pairs_mut().append_pair("state", state);
        Ok(url)
    }

    /// Callback exchange URL, which tells the backend where the provider sent the user.
    ///
    /// # Errors
    /// Returns an error if the configured API base URL is not a valid URL.
    pub fn google_callback_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.api_url(GOOGLE_CALLBACK_PATH))?;
        url.query_pairs_mut()
            .append_pair("redirect_uri", &self.google_redirect_uri());
        Ok(url)
    }
}

fn apply_overrides(config: &mut AppConfig, overrides: ConfigOverrides) {
    if let Some(value) = overrides.api_base_url.as_deref().and_then(normalize_value) {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.frontend_url.as_deref().and_then(normalize_value) {
        config.frontend_url = value;
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Joins a base URL and a path without doubling or dropping slashes.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

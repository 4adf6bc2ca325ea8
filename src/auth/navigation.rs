//! Where a flow sends the user next. Delays exist only so the user can read
//! the preceding notice; they are never retries.

use std::{fmt, time::Duration};

/// Delay before leaving a successful password login.
pub const LOGIN_SUCCESS_DELAY: Duration = Duration::from_secs(2);
/// Delay before leaving a successful Google login.
pub const GOOGLE_SUCCESS_DELAY: Duration = Duration::from_secs(3);
/// Delay before returning to login after a fatal error.
pub const ERROR_REDIRECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    /// Signup wizard, optionally prefilled with a provider-verified email.
    Signup { email: Option<String> },
}

impl Route {
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Signup { .. } => "/signup",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub delay: Duration,
}

impl Navigation {
    #[must_use]
    pub fn now(route: Route) -> Self {
        Self {
            route,
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn after(route: Route, delay: Duration) -> Self {
        Self { route, delay }
    }

    /// Back to login after the error display delay.
    #[must_use]
    pub fn error_to_login() -> Self {
        Self::after(Route::Login, ERROR_REDIRECT_DELAY)
    }
}

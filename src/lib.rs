//! # Authflow (client-side authentication sequencer)
//!
//! `authflow` drives the client half of an account lifecycle against a remote
//! REST backend. Token issuance, OTP validation and the Google code exchange
//! all live on the server; this crate only sequences the calls, validates
//! input locally and decides where the user goes next.
//!
//! ## Flows
//!
//! - **Session gate:** on entry, the persisted session is inspected. An
//!   unexpired access token forwards to the dashboard; an expired one is
//!   refreshed exactly once if a refresh token and user id exist.
//! - **Login:** credentials are posted, the server answers with a user id and
//!   an email OTP challenge opens. A verified OTP yields the token pair that
//!   becomes the new session.
//! - **Signup:** a four-step wizard (email, identity, professional details,
//!   credentials). The email must be confirmed by OTP before step 4 can be
//!   submitted.
//! - **Google OAuth:** a single-use nonce is stored before the redirect and
//!   consumed on return. New users continue to signup with the email
//!   prefilled, existing users continue to the OTP challenge.
//!
//! Navigation is returned as data ([`auth::Navigation`]) so that any front end,
//! including the bundled CLI, can render it.

pub mod api;
pub mod auth;
pub mod cli;
pub mod signup;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}

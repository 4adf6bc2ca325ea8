//! Authentication flows: session gate, password login, OTP challenges and
//! Google OAuth. Each flow takes its collaborators explicitly (an
//! [`crate::api::ApiClient`] and a [`SessionContext`]) and reports where the
//! user should go next as a [`Navigation`].

pub mod client;
pub mod error;
pub mod gate;
pub mod login;
pub mod navigation;
pub mod oauth;
pub mod otp;
pub mod session;
pub mod token;
pub mod types;

pub use error::{AuthError, OAuthError};
pub use gate::SessionGate;
pub use login::{LoginFlow, LoginOutcome};
pub use navigation::{Navigation, Route};
pub use oauth::{CallbackParams, OAuthHandshake, OAuthReturn};
pub use otp::{ChallengeContext, OtpChallenge};
pub use session::{Session, SessionContext};

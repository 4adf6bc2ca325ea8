use crate::{api::AppError, storage::StorageError};
use thiserror::Error;

/// Generic message for failures where the server could not be reached.
pub const CONNECTION_MESSAGE: &str = "Unable to connect to the server. Please try again later.";

/// Flow-level failures. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Local input check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),
    /// The backend rejected the request (bad credentials, invalid OTP, ...).
    #[error("{0}")]
    Authentication(String),
    /// The backend was unreachable or answered with something unusable.
    #[error("{0}")]
    Transport(String),
    /// OAuth integrity failure; always fatal to the current attempt.
    #[error("{0}")]
    OAuth(#[from] OAuthError),
    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("{0}")]
    Provider(String),
    #[error("Authorization code not found")]
    MissingCode,
    #[error("State parameter missing")]
    MissingState,
    #[error("Invalid state parameter")]
    StateMismatch,
    #[error("{0}")]
    Exchange(String),
    #[error("Invalid response from server")]
    InvalidResponse,
}

impl AuthError {
    /// Maps a transport error, using `fallback` when the server gave no message.
    pub(crate) fn from_api(err: AppError, fallback: &str) -> Self {
        match err {
            AppError::Http { message, .. } => {
                if message.is_empty() || message == "Request failed." {
                    AuthError::Authentication(fallback.to_string())
                } else {
                    AuthError::Authentication(message)
                }
            }
            AppError::Network(_) | AppError::Timeout(_) => {
                AuthError::Transport(CONNECTION_MESSAGE.to_string())
            }
            AppError::Parse(message)
            | AppError::Config(message)
            | AppError::Serialization(message) => AuthError::Transport(message),
        }
    }
}

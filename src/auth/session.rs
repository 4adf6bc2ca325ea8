//! Authenticated session record and the context object that owns it. The
//! context keeps an in-memory copy and mirrors it to durable storage under a
//! single key. A session is only ever replaced or cleared as a whole.

use crate::{
    auth::token,
    storage::{Storage, StorageError},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt,
    sync::{Arc, RwLock},
};
use tracing::{debug, warn};

/// Durable storage key holding the serialized session.
pub const SESSION_KEY: &str = "authData";

/// Profile keys that would shadow or duplicate the session's own token fields.
const RESERVED_KEYS: [&str; 5] = [
    "accessToken",
    "access_token",
    "refreshToken",
    "refresh_token",
    "userId",
];

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(alias = "access_token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Session {
    /// Builds the session that follows a verified OTP: exactly the new token
    /// pair plus the user's profile fields.
    #[must_use]
    pub fn from_verified_login(
        access_token: String,
        refresh_token: String,
        user: Map<String, Value>,
    ) -> Self {
        let user_id = ["_id", "userId", "id"]
            .iter()
            .find_map(|key| user.get(*key).and_then(Value::as_str))
            .map(str::to_string);

        let profile = user
            .into_iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .collect();

        Self {
            access_token,
            refresh_token: Some(refresh_token),
            user_id,
            profile,
        }
    }

    /// Session after a refresh: the new pair and the prior user id, nothing else.
    #[must_use]
    pub fn refreshed(access_token: String, refresh_token: String, user_id: String) -> Self {
        Self {
            access_token,
            refresh_token: Some(refresh_token),
            user_id: Some(user_id),
            profile: Map::new(),
        }
    }

    /// Valid while the access token's encoded expiry is in the future.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        !token::is_token_expired(&self.access_token, now)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.profile.get("email").and_then(Value::as_str)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("access_token", &"[redacted]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("user_id", &self.user_id)
            .field("profile_fields", &self.profile.len())
            .finish()
    }
}

/// Single source of truth for the current session, injected into every flow.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn Storage>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads the persisted record into memory. A record that cannot be parsed
    /// is deleted and treated as absent.
    ///
    /// # Errors
    /// Returns an error if the durable storage cannot be accessed.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        let loaded = match self.storage.get(SESSION_KEY)? {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!("Discarding unreadable session record: {}", err);
                    self.storage.remove(SESSION_KEY)?;
                    None
                }
            },
            None => None,
        };

        debug!("session loaded: {}", loaded.is_some());
        *self.current.write()? = loaded.clone();
        Ok(loaded)
    }

    /// In-memory copy of the current session.
    ///
    /// # Errors
    /// Returns an error if the in-memory lock is poisoned.
    pub fn current(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.current.read()?.clone())
    }

    /// Replaces the session in memory and in durable storage.
    ///
    /// # Errors
    /// Returns an error if the durable write fails; memory is left unchanged in that case.
    pub fn replace(&self, session: Session) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&session)
            .map_err(|err| StorageError::Io(std::io::Error::other(err)))?;

        let mut current = self.current.write()?;
        self.storage.set(SESSION_KEY, &raw)?;
        *current = Some(session);
        Ok(())
    }

    /// Removes the session from memory and durable storage.
    ///
    /// # Errors
    /// Returns an error if the durable record cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut current = self.current.write()?;
        *current = None;
        self.storage.remove(SESSION_KEY)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

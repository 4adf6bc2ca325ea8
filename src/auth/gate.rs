//! Entry check run once per visit: decide between dashboard and login from
//! the persisted session, refreshing an expired access token at most once.

use crate::{
    api::ApiClient,
    auth::{
        client,
        error::AuthError,
        navigation::{Navigation, Route},
        session::{Session, SessionContext},
        token,
    },
};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Debug)]
pub struct SessionGate {
    api: ApiClient,
    session: SessionContext,
}

impl SessionGate {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionContext) -> Self {
        Self { api, session }
    }

    /// Runs the check against the current clock.
    ///
    /// # Errors
    /// Returns an error only if the session storage cannot be read or written.
    pub async fn check(&self) -> Result<Navigation, AuthError> {
        self.check_at(token::now_unix()).await
    }

    /// Runs the check as of `now` (seconds since the Unix epoch).
    ///
    /// # Errors
    /// Returns an error only if the session storage cannot be read or written.
    #[instrument(skip(self))]
    pub async fn check_at(&self, now: i64) -> Result<Navigation, AuthError> {
        let Some(session) = self.session.load()? else {
            debug!("no stored session");
            return self.to_login();
        };

        if session.is_valid_at(now) {
            debug!("access token still valid");
            return Ok(Navigation::now(Route::Dashboard));
        }

        let (Some(refresh_token), Some(user_id)) = (session.refresh_token, session.user_id) else {
            info!("access token expired and cannot be refreshed");
            return self.to_login();
        };

        match client::refresh_token(&self.api, &user_id, &refresh_token).await {
            Ok(tokens) => {
                self.session.replace(Session::refreshed(
                    tokens.access_token,
                    tokens.refresh_token,
                    user_id,
                ))?;
                info!("access token refreshed");
                Ok(Navigation::now(Route::Dashboard))
            }
            Err(err) => {
                warn!("token refresh failed: {}", err);
                self.to_login()
            }
        }
    }

    fn to_login(&self) -> Result<Navigation, AuthError> {
        self.session.clear()?;
        Ok(Navigation::now(Route::Login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::tests::{can_bind_localhost, client_for},
        auth::{session::SESSION_KEY, token::tests::token_with_exp},
        storage::{MemoryStorage, Storage},
    };
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NOW: i64 = 1_800_000_000;

    fn gate_with(server: &MockServer, stored: Option<Session>) -> Result<(SessionGate, Arc<MemoryStorage>)> {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(session) = stored {
            storage.set(SESSION_KEY, &serde_json::to_string(&session)?)?;
        }
        let gate = SessionGate::new(
            client_for(server)?,
            SessionContext::new(storage.clone()),
        );
        Ok((gate, storage))
    }

    fn expired(refresh: Option<&str>, user_id: Option<&str>) -> Session {
        Session {
            access_token: token_with_exp(NOW - 60),
            refresh_token: refresh.map(str::to_string),
            user_id: user_id.map(str::to_string),
            profile: serde_json::Map::new(),
        }
    }

    async fn refresh_mock(server: &MockServer, status: u16, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh-token"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "data": {"access_token": "fresh-a", "refresh_token": "fresh-r"}
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn no_session_routes_to_login() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        refresh_mock(&server, 200, 0).await;

        let (gate, _) = gate_with(&server, None)?;
        assert_eq!(gate.check_at(NOW).await?, Navigation::now(Route::Login));
        Ok(())
    }

    #[tokio::test]
    async fn valid_token_routes_to_dashboard() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        refresh_mock(&server, 200, 0).await;

        let session = Session::refreshed(token_with_exp(NOW + 60), "r".to_string(), "u1".to_string());
        let (gate, storage) = gate_with(&server, Some(session))?;
        assert_eq!(gate.check_at(NOW).await?, Navigation::now(Route::Dashboard));
        assert!(storage.get(SESSION_KEY)?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_once() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh-token"))
            .and(body_json(json!({"userId": "u1", "refreshToken": "old-r"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"access_token": "fresh-a", "refresh_token": "fresh-r"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (gate, storage) = gate_with(&server, Some(expired(Some("old-r"), Some("u1"))))?;
        assert_eq!(gate.check_at(NOW).await?, Navigation::now(Route::Dashboard));

        let raw = storage
            .get(SESSION_KEY)?
            .ok_or_else(|| anyhow!("session missing"))?;
        let stored: Session = serde_json::from_str(&raw)?;
        assert_eq!(stored.access_token, "fresh-a");
        assert_eq!(stored.refresh_token.as_deref(), Some("fresh-r"));
        assert_eq!(stored.user_id.as_deref(), Some("u1"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_clears_session() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        refresh_mock(&server, 401, 1).await;

        let (gate, storage) = gate_with(&server, Some(expired(Some("old-r"), Some("u1"))))?;
        assert_eq!(gate.check_at(NOW).await?, Navigation::now(Route::Login));
        assert_eq!(storage.get(SESSION_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn expired_without_refresh_material_skips_refresh() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        refresh_mock(&server, 200, 0).await;

        for session in [expired(None, Some("u1")), expired(Some("r"), None)] {
            let (gate, storage) = gate_with(&server, Some(session))?;
            assert_eq!(gate.check_at(NOW).await?, Navigation::now(Route::Login));
            assert_eq!(storage.get(SESSION_KEY)?, None);
        }
        Ok(())
    }
}

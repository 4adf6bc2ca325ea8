use crate::{
    api::{config::ConfigOverrides, ApiClient, AppConfig},
    auth::SessionContext,
    storage::{FileStorage, Storage},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};

/// Subdirectory holding data that survives restarts (the session record).
pub const LOCAL_DIR: &str = "local";
/// Subdirectory holding data scoped to one redirect round trip (the OAuth nonce).
pub const SESSION_DIR: &str = "session";

#[derive(Clone, Debug)]
pub struct GlobalArgs {
    pub config: AppConfig,
    pub state_dir: PathBuf,
}

/// Storage and clients shared by every action.
#[derive(Clone)]
pub struct Runtime {
    pub api: ApiClient,
    pub session: SessionContext,
    pub session_scoped: Arc<dyn Storage>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(overrides: ConfigOverrides, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: AppConfig::load(overrides),
            state_dir: state_dir.into(),
        }
    }

    /// Opens both storage scopes under the state directory and builds the API client.
    ///
    /// # Errors
    /// Returns an error if a storage directory cannot be created or the HTTP client fails to build.
    pub fn runtime(&self) -> Result<Runtime> {
        let local = FileStorage::open(self.state_dir.join(LOCAL_DIR))
            .with_context(|| format!("cannot open {}", self.state_dir.display()))?;
        let session_scoped = FileStorage::open(self.state_dir.join(SESSION_DIR))
            .with_context(|| format!("cannot open {}", self.state_dir.display()))?;

        Ok(Runtime {
            api: ApiClient::new(self.config.clone())?,
            session: SessionContext::new(Arc::new(local)),
            session_scoped: Arc::new(session_scoped),
        })
    }
}

use crate::{auth::oauth::OAUTH_STATE_KEY, cli::globals::GlobalArgs};
use anyhow::Result;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Forget the session and any pending nonce.
/// # Errors
/// Returns an error if either record cannot be removed.
pub fn execute(args: Args) -> Result<()> {
    let runtime = args.globals.runtime()?;
    runtime.session.clear()?;
    runtime.session_scoped.remove(OAUTH_STATE_KEY)?;

    info!("session cleared");
    println!("Logged out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::config::ConfigOverrides, auth::Session, storage::Storage};

    #[test]
    fn logout_clears_session_and_nonce() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let globals = GlobalArgs::new(ConfigOverrides::default(), dir.path());
        let runtime = globals.runtime()?;
        runtime.session.replace(Session::refreshed(
            "a".to_string(),
            "r".to_string(),
            "u1".to_string(),
        ))?;
        runtime.session_scoped.set(OAUTH_STATE_KEY, "n1")?;

        execute(Args { globals: globals.clone() })?;

        let reopened = globals.runtime()?;
        assert_eq!(reopened.session.load()?, None);
        assert_eq!(reopened.session_scoped.get(OAUTH_STATE_KEY)?, None);
        Ok(())
    }
}

use crate::cli::actions::{google, login, logout, session, signup, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Session(args) => session::execute(args).await,
        Action::Login(args) => login::execute(args).await,
        Action::Signup(args) => signup::execute(args).await,
        Action::GoogleStart(args) => google::start(args),
        Action::GoogleCallback(args) => google::callback(args).await,
        Action::Logout(args) => logout::execute(args),
    }
}

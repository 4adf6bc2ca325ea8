pub mod google;
pub mod login;
pub mod logout;
pub mod prompt;
pub mod session;
pub mod signup;

// Internal "interpreter" for `Action`, kept apart so this file stays small.
mod run;

#[derive(Debug)]
pub enum Action {
    Session(session::Args),
    Login(login::Args),
    Signup(signup::Args),
    GoogleStart(google::StartArgs),
    GoogleCallback(google::CallbackArgs),
    Logout(logout::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

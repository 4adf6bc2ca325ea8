use crate::{
    auth::{LoginFlow, LoginOutcome},
    cli::{
        actions::prompt::{complete_challenge, print_completion, CodeSource},
        globals::GlobalArgs,
    },
};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub otp: Option<String>,
}

/// Execute the password login.
/// # Errors
/// Returns the login or verification failure as shown to the user.
pub async fn execute(args: Args) -> Result<()> {
    let runtime = args.globals.runtime()?;
    let flow = LoginFlow::new(runtime.api.clone(), runtime.session.clone());
    let mut codes = CodeSource::new(args.otp);

    let (mut challenge, notice) = match flow.login(&args.email, &args.password).await? {
        LoginOutcome::OtpRequired(challenge) => {
            (challenge, "A verification code was sent to your email.")
        }
        LoginOutcome::EmailVerificationRequired { challenge, notice } => (challenge, notice),
    };
    debug!("challenge opened: {:?}", challenge.context());
    println!("{notice}");

    let completion =
        complete_challenge(&mut challenge, &runtime.api, &runtime.session, &mut codes).await?;
    print_completion(&completion);
    Ok(())
}

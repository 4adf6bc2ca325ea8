use crate::{
    auth::{CallbackParams, OAuthHandshake, OAuthReturn},
    cli::{
        actions::prompt::{complete_challenge, print_completion, print_navigation, CodeSource},
        globals::GlobalArgs,
    },
};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct StartArgs {
    pub globals: GlobalArgs,
}

#[derive(Debug)]
pub struct CallbackArgs {
    pub globals: GlobalArgs,
    pub url: String,
    pub otp: Option<String>,
}

/// Store a fresh nonce and print the provider URL.
/// # Errors
/// Returns an error if the nonce cannot be stored.
pub fn start(args: StartArgs) -> Result<()> {
    let runtime = args.globals.runtime()?;
    let mut handshake = OAuthHandshake::new(runtime.api, runtime.session_scoped);

    let url = handshake.begin()?;
    println!("Open this URL to continue with Google:");
    println!("{url}");
    println!("Then run: authflow google callback --url '<redirect url>'");
    Ok(())
}

/// Validate the provider redirect and finish sign-in.
/// # Errors
/// Returns the handshake or verification failure.
pub async fn callback(args: CallbackArgs) -> Result<()> {
    let runtime = args.globals.runtime()?;
    let params = CallbackParams::from_url(&args.url).context("invalid redirect URL")?;
    let mut handshake = OAuthHandshake::new(runtime.api.clone(), runtime.session_scoped.clone());

    match handshake.complete(&params).await {
        Ok(OAuthReturn::NewUser { email, navigation }) => {
            println!("No account exists for {email} yet.");
            print_navigation(&navigation);
            Ok(())
        }
        Ok(OAuthReturn::OtpRequired(mut challenge)) => {
            println!("A verification code was sent to your email.");
            let mut codes = CodeSource::new(args.otp);
            let completion =
                complete_challenge(&mut challenge, &runtime.api, &runtime.session, &mut codes)
                    .await?;
            handshake.mark_session_established();
            info!("google sign-in complete");
            print_completion(&completion);
            Ok(())
        }
        Err(failure) => {
            print_navigation(&failure.navigation);
            Err(failure.into())
        }
    }
}

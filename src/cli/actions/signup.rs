use crate::{
    cli::{
        actions::prompt::{print_navigation, CodeSource},
        globals::GlobalArgs,
    },
    signup::{SignupFlow, SignupStep, SignupWizard},
};
use anyhow::{bail, Result};
use secrecy::SecretString;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: Option<String>,
    pub google_email: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub phone: String,
    pub company: String,
    pub industry: Option<String>,
    pub work_role: String,
    pub other_work_role: Option<String>,
    pub password: SecretString,
    pub confirm_password: Option<SecretString>,
    pub otp: Option<String>,
}

/// Walk the wizard from step 1 to account creation.
/// # Errors
/// Returns the first validation, verification or signup failure.
pub async fn execute(args: Args) -> Result<()> {
    let runtime = args.globals.runtime()?;

    let mut wizard = match &args.google_email {
        Some(email) => SignupWizard::with_verified_email(email.as_str()),
        None => {
            let mut wizard = SignupWizard::new();
            wizard.set_email(args.email.as_deref().unwrap_or_default())?;
            wizard
        }
    };

    let draft = wizard.draft_mut();
    draft.first_name = args.first_name;
    draft.middle_name = args.middle_name.unwrap_or_default();
    draft.last_name = args.last_name;
    draft.set_phone(args.phone);
    draft.company = args.company;
    draft.industry = args.industry.unwrap_or_default();
    draft.work_role = args.work_role;
    draft.other_work_role = args.other_work_role.unwrap_or_default();
    draft.confirm_password = args
        .confirm_password
        .unwrap_or_else(|| args.password.clone());
    draft.password = args.password;

    let mut flow = SignupFlow::with_wizard(runtime.api, wizard);
    let mut codes = CodeSource::new(args.otp);

    loop {
        let step = flow.wizard().step();
        println!("{step}: {} ({}% complete)", step.title(), step.progress());

        match flow.next().await? {
            SignupStep::Moved(next) => info!("moved to {}", next),
            SignupStep::VerifyEmail {
                mut challenge,
                notice,
            } => {
                println!("{notice}");
                loop {
                    let Some(code) = codes.next(challenge.context().title()).await? else {
                        bail!("Please verify your email before continuing");
                    };
                    match flow.confirm_email(&mut challenge, &code).await {
                        Ok(notice) => {
                            println!("{notice}");
                            break;
                        }
                        Err(failure) if codes.interactive() && challenge.is_open() => {
                            eprintln!("{failure}");
                        }
                        Err(failure) => return Err(failure.into()),
                    }
                }
            }
            SignupStep::ReadyToSubmit(request) => {
                let completed = flow.submit(request).await?;
                println!("{}", completed.notice);
                print_navigation(&completed.navigation);
                return Ok(());
            }
        }
    }
}

//! Maps validated CLI matches to an [`Action`] with its global settings.

use crate::{
    api::config::ConfigOverrides,
    cli::{
        actions::{google, login, logout, session, signup, Action},
        commands::{backend, flows},
        globals::GlobalArgs,
    },
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some((flows::CMD_SESSION, _)) => Ok(Action::Session(session::Args { globals })),
        Some((flows::CMD_LOGIN, sub_m)) => Ok(Action::Login(login::Args {
            globals,
            email: required(sub_m, "email")?,
            password: secret(sub_m, "password")?,
            otp: optional(sub_m, "otp"),
        })),
        Some((flows::CMD_SIGNUP, sub_m)) => Ok(Action::Signup(signup::Args {
            globals,
            email: optional(sub_m, "email"),
            google_email: optional(sub_m, "google-email"),
            first_name: required(sub_m, "first-name")?,
            middle_name: optional(sub_m, "middle-name"),
            last_name: required(sub_m, "last-name")?,
            phone: required(sub_m, "phone")?,
            company: required(sub_m, "company")?,
            industry: optional(sub_m, "industry"),
            work_role: required(sub_m, "work-role")?,
            other_work_role: optional(sub_m, "other-work-role"),
            password: secret(sub_m, "password")?,
            confirm_password: optional(sub_m, "confirm-password").map(SecretString::from),
            otp: optional(sub_m, "otp"),
        })),
        Some((flows::CMD_GOOGLE, sub_m)) => match sub_m.subcommand() {
            Some((flows::CMD_GOOGLE_START, _)) => {
                Ok(Action::GoogleStart(google::StartArgs { globals }))
            }
            Some((flows::CMD_GOOGLE_CALLBACK, callback_m)) => {
                Ok(Action::GoogleCallback(google::CallbackArgs {
                    globals,
                    url: required(callback_m, "url")?,
                    otp: optional(callback_m, "otp"),
                }))
            }
            _ => Err(anyhow!("unknown google subcommand")),
        },
        Some((flows::CMD_LOGOUT, _)) => Ok(Action::Logout(logout::Args { globals })),
        _ => Err(anyhow!("no subcommand given")),
    }
}

fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let state_dir = required(matches, backend::ARG_STATE_DIR)?;
    Ok(GlobalArgs::new(
        ConfigOverrides {
            api_base_url: optional(matches, backend::ARG_API_URL),
            frontend_url: optional(matches, backend::ARG_FRONTEND_URL),
        },
        state_dir,
    ))
}

fn optional(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    optional(matches, id).with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    required(matches, id).map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_login_action() -> Result<()> {
        temp_env::with_vars(
            [
                ("AUTHFLOW_PASSWORD", None::<&str>),
                ("AUTHFLOW_API_URL", None::<&str>),
            ],
            || -> Result<()> {
                let matches = commands::new().try_get_matches_from(vec![
                    "authflow",
                    "--state-dir",
                    "/tmp/authflow-test",
                    "--api-url",
                    "http://127.0.0.1:9000",
                    "login",
                    "--email",
                    "jane@corp.com",
                    "--password",
                    "hunter22",
                ])?;

                let Action::Login(args) = handler(&matches)? else {
                    return Err(anyhow!("expected login action"));
                };
                assert_eq!(args.email, "jane@corp.com");
                assert_eq!(args.password.expose_secret(), "hunter22");
                assert_eq!(args.otp, None);
                assert_eq!(args.globals.config.api_base_url, "http://127.0.0.1:9000");
                assert_eq!(
                    args.globals.state_dir,
                    std::path::PathBuf::from("/tmp/authflow-test")
                );
                Ok(())
            },
        )
    }

    #[test]
    fn test_signup_action_defaults() -> Result<()> {
        temp_env::with_vars([("AUTHFLOW_PASSWORD", Some("Str0ng!pass"))], || -> Result<()> {
            let matches = commands::new().try_get_matches_from(vec![
                "authflow",
                "signup",
                "--google-email",
                "jane@corp.com",
                "--first-name",
                "Jane",
                "--last-name",
                "Doe",
                "--phone",
                "+1 4155552671",
                "--company",
                "Corp",
                "--work-role",
                "auditor",
            ])?;

            let Action::Signup(args) = handler(&matches)? else {
                return Err(anyhow!("expected signup action"));
            };
            assert_eq!(args.email, None);
            assert_eq!(args.google_email.as_deref(), Some("jane@corp.com"));
            assert_eq!(args.work_role, "auditor");
            assert_eq!(args.password.expose_secret(), "Str0ng!pass");
            assert!(args.confirm_password.is_none());
            Ok(())
        })
    }

    #[test]
    fn test_google_actions() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec!["authflow", "google", "start"])?;
        assert!(matches!(handler(&matches)?, Action::GoogleStart(_)));

        let matches = commands::new().try_get_matches_from(vec![
            "authflow",
            "google",
            "callback",
            "--url",
            "http://localhost:3000/oauth/google/callback?code=c&state=s",
            "--otp",
            "123456",
        ])?;
        let Action::GoogleCallback(args) = handler(&matches)? else {
            return Err(anyhow!("expected callback action"));
        };
        assert_eq!(args.otp.as_deref(), Some("123456"));
        Ok(())
    }
}

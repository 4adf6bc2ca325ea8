use crate::signup::roles::WORK_ROLES;
use clap::{builder::PossibleValuesParser, Arg, Command};

pub const CMD_SESSION: &str = "session";
pub const CMD_LOGIN: &str = "login";
pub const CMD_SIGNUP: &str = "signup";
pub const CMD_GOOGLE: &str = "google";
pub const CMD_GOOGLE_START: &str = "start";
pub const CMD_GOOGLE_CALLBACK: &str = "callback";
pub const CMD_LOGOUT: &str = "logout";

fn otp_arg() -> Arg {
    Arg::new("otp")
        .long("otp")
        .help("One-time code; prompted on stdin when omitted")
}

fn password_arg() -> Arg {
    Arg::new("password")
        .long("password")
        .help("Account password")
        .env("AUTHFLOW_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand_required(true)
        .subcommand(
            Command::new(CMD_SESSION).about("Check the stored session and print where to go next"),
        )
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Log in with email, password and an emailed code")
                .arg(
                    Arg::new("email")
                        .long("email")
                        .help("Account email")
                        .required(true),
                )
                .arg(password_arg())
                .arg(otp_arg()),
        )
        .subcommand(signup())
        .subcommand(
            Command::new(CMD_GOOGLE)
                .about("Sign in with Google")
                .subcommand_required(true)
                .subcommand(
                    Command::new(CMD_GOOGLE_START)
                        .about("Store a fresh state nonce and print the provider URL"),
                )
                .subcommand(
                    Command::new(CMD_GOOGLE_CALLBACK)
                        .about("Complete sign-in from the URL the provider redirected to")
                        .arg(
                            Arg::new("url")
                                .long("url")
                                .help("Full redirect URL including its query string")
                                .required(true),
                        )
                        .arg(otp_arg()),
                ),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the session and any pending OAuth state"))
}

fn signup() -> Command {
    let roles: Vec<&'static str> = WORK_ROLES.iter().map(|role| role.value).collect();

    Command::new(CMD_SIGNUP)
        .about("Create an account")
        .arg(
            Arg::new("email")
                .long("email")
                .help("Work email")
                .required_unless_present("google-email")
                .conflicts_with("google-email"),
        )
        .arg(
            Arg::new("google-email")
                .long("google-email")
                .help("Email already verified by a Google sign-in"),
        )
        .arg(Arg::new("first-name").long("first-name").required(true))
        .arg(Arg::new("middle-name").long("middle-name"))
        .arg(Arg::new("last-name").long("last-name").required(true))
        .arg(
            Arg::new("phone")
                .long("phone")
                .help("Business phone number including the country code, e.g. \"+1 4155552671\"")
                .required(true),
        )
        .arg(Arg::new("company").long("company").required(true))
        .arg(Arg::new("industry").long("industry"))
        .arg(
            Arg::new("work-role")
                .long("work-role")
                .required(true)
                .value_parser(PossibleValuesParser::new(roles)),
        )
        .arg(
            Arg::new("other-work-role")
                .long("other-work-role")
                .help("Work role when --work-role is \"other\""),
        )
        .arg(password_arg())
        .arg(
            Arg::new("confirm-password")
                .long("confirm-password")
                .help("Password confirmation (default: same as --password)"),
        )
        .arg(otp_arg())
}

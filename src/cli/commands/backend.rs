use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_FRONTEND_URL: &str = "frontend-url";
pub const ARG_STATE_DIR: &str = "state-dir";

pub const DEFAULT_STATE_DIR: &str = ".authflow";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Backend API base URL")
                .env("AUTHFLOW_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_FRONTEND_URL)
                .long("frontend-url")
                .help("Frontend base URL the identity provider redirects back to")
                .env("AUTHFLOW_FRONTEND_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long("state-dir")
                .help("Directory holding the session and pending OAuth state")
                .env("AUTHFLOW_STATE_DIR")
                .default_value(DEFAULT_STATE_DIR)
                .global(true),
        )
}

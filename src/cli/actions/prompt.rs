//! Terminal side of the flows: reading one-time codes and printing where the
//! user goes next. Prompts go to stderr, results to stdout.

use crate::{
    api::ApiClient,
    auth::{
        otp::{Completion, FailurePolicy},
        Navigation, OtpChallenge, Route, SessionContext,
    },
};
use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

/// Codes come from a flag (one attempt) or, when none was given, from stdin
/// until it is exhausted.
pub struct CodeSource {
    preset: Option<String>,
    interactive: bool,
    lines: Option<Lines<BufReader<Stdin>>>,
}

impl CodeSource {
    #[must_use]
    pub fn new(preset: Option<String>) -> Self {
        Self {
            interactive: preset.is_none(),
            preset,
            lines: None,
        }
    }

    #[must_use]
    pub fn interactive(&self) -> bool {
        self.interactive
    }

    /// Next code to try, or `None` when no more input is available.
    ///
    /// # Errors
    /// Returns an error if stdin cannot be read.
    pub async fn next(&mut self, title: &str) -> Result<Option<String>> {
        if let Some(code) = self.preset.take() {
            return Ok(Some(code));
        }
        if !self.interactive {
            return Ok(None);
        }

        eprint!("{title}: ");
        let lines = self
            .lines
            .get_or_insert_with(|| BufReader::new(tokio::io::stdin()).lines());

        while let Some(line) = lines.next_line().await? {
            let code = line.trim();
            if !code.is_empty() {
                return Ok(Some(code.to_string()));
            }
            eprint!("{title}: ");
        }
        debug!("stdin closed");
        Ok(None)
    }
}

/// Submits codes until the challenge completes, the backend closes it, or
/// input runs out.
///
/// # Errors
/// Returns the last verification failure, or an error if no code was available.
pub async fn complete_challenge(
    challenge: &mut OtpChallenge,
    api: &ApiClient,
    session: &SessionContext,
    codes: &mut CodeSource,
) -> Result<Completion> {
    loop {
        let Some(code) = codes.next(challenge.context().title()).await? else {
            bail!("Verification code required");
        };

        match challenge.complete(api, session, &code).await {
            Ok(completion) => return Ok(completion),
            Err(failure) => {
                let retry = codes.interactive()
                    && challenge.is_open()
                    && challenge.context().failure_policy() == FailurePolicy::KeepOpen;
                if !retry {
                    if let Some(navigation) = &failure.navigation {
                        print_navigation(navigation);
                    }
                    return Err(failure.into());
                }
                eprintln!("{failure}");
            }
        }
    }
}

pub fn print_completion(completion: &Completion) {
    println!("{}", completion.notice);
    if let Some(navigation) = &completion.navigation {
        print_navigation(navigation);
    }
}

pub fn print_navigation(navigation: &Navigation) {
    if navigation.delay.is_zero() {
        println!("Next: {}", navigation.route);
    } else {
        println!(
            "Next: {} (after {}s)",
            navigation.route,
            navigation.delay.as_secs()
        );
    }
    if let Route::Signup { email: Some(email) } = &navigation.route {
        println!("Continue with: authflow signup --google-email {email} ...");
    }
}

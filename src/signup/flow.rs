//! Network side of the signup wizard: requesting and confirming the email
//! code, and creating the account once the wizard produced a request.

use crate::{
    api::ApiClient,
    auth::{
        client,
        error::AuthError,
        navigation::{Navigation, Route},
        otp::{ChallengeContext, OtpChallenge, OtpFailure, OtpOutcome},
    },
    signup::wizard::{Advance, SignupRequest, SignupWizard, Step},
};
use tracing::{info, instrument};

pub const VERIFICATION_SENT_NOTICE: &str =
    "Verification email sent! Please check your email and enter the code below.";
pub const EMAIL_VERIFIED_NOTICE: &str = "Email verified successfully!";
pub const ACCOUNT_CREATED_NOTICE: &str = "Account created successfully! You can now log in.";

#[derive(Debug)]
pub enum SignupStep {
    Moved(Step),
    /// A code was emailed; confirm it with [`SignupFlow::confirm_email`].
    VerifyEmail {
        challenge: OtpChallenge,
        notice: &'static str,
    },
    ReadyToSubmit(SignupRequest),
}

#[derive(Debug, PartialEq, Eq)]
pub struct SignupCompleted {
    pub notice: &'static str,
    pub navigation: Navigation,
}

#[derive(Debug)]
pub struct SignupFlow {
    api: ApiClient,
    wizard: SignupWizard,
}

impl SignupFlow {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::with_wizard(api, SignupWizard::new())
    }

    /// Continues a signup started elsewhere, e.g. after a Google sign-in for
    /// an unknown account.
    #[must_use]
    pub fn with_wizard(api: ApiClient, wizard: SignupWizard) -> Self {
        Self { api, wizard }
    }

    #[must_use]
    pub fn wizard(&self) -> &SignupWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut SignupWizard {
        &mut self.wizard
    }

    /// Advances the wizard, requesting a verification code when step 1 asks for one.
    ///
    /// # Errors
    /// Returns the wizard's validation error or the reason the code could not be sent.
    #[instrument(skip(self), fields(step = self.wizard.step().number()))]
    pub async fn next(&mut self) -> Result<SignupStep, AuthError> {
        match self.wizard.advance()? {
            Advance::Moved(step) => Ok(SignupStep::Moved(step)),
            Advance::ReadyToSubmit(request) => Ok(SignupStep::ReadyToSubmit(request)),
            Advance::VerifyEmail => {
                let email = self.wizard.draft().email().to_string();
                client::send_confirm_email(&self.api, &email)
                    .await
                    .map_err(|err| AuthError::from_api(err, "Failed to send verification email"))?;

                self.wizard.mark_email_sent();
                info!("signup verification code sent");
                Ok(SignupStep::VerifyEmail {
                    challenge: OtpChallenge::open(email, ChallengeContext::SignupEmail),
                    notice: VERIFICATION_SENT_NOTICE,
                })
            }
        }
    }

    /// Confirms the emailed code. On success the wizard moves to step 2; on
    /// failure the challenge stays open for another try.
    ///
    /// # Errors
    /// Returns `OtpFailure` if the challenge does not belong to this draft's
    /// email or the backend rejects the code.
    pub async fn confirm_email(
        &mut self,
        challenge: &mut OtpChallenge,
        code: &str,
    ) -> Result<&'static str, OtpFailure> {
        if challenge.context() != ChallengeContext::SignupEmail
            || challenge.subject() != self.wizard.draft().email()
        {
            return Err(OtpFailure {
                error: AuthError::Validation(
                    "Verification code does not match the current email".to_string(),
                ),
                navigation: None,
            });
        }

        match challenge.submit(&self.api, code).await? {
            OtpOutcome::EmailVerified => {
                self.wizard.mark_email_verified();
                Ok(EMAIL_VERIFIED_NOTICE)
            }
            OtpOutcome::Tokens(_) => Err(OtpFailure {
                error: AuthError::Transport("Unexpected verification response".to_string()),
                navigation: None,
            }),
        }
    }

    /// Creates the account. The draft is discarded on success and kept on failure.
    ///
    /// # Errors
    /// Returns the server's message, or a generic one when it gave none.
    #[instrument(skip_all)]
    pub async fn submit(&mut self, request: SignupRequest) -> Result<SignupCompleted, AuthError> {
        client::signup(&self.api, &request)
            .await
            .map_err(|err| AuthError::from_api(err, "Failed to create account"))?;

        self.wizard = SignupWizard::new();
        info!("account created");
        Ok(SignupCompleted {
            notice: ACCOUNT_CREATED_NOTICE,
            navigation: Navigation::now(Route::Login),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::tests::{can_bind_localhost, client_for},
        signup::wizard::{tests::completed_wizard, VerificationStep},
    };
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn email_step_sends_and_confirms_code() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/send-confirm-email"))
            .and(body_json(json!({"email": "jane@corp.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/users/confirm-email"))
            .and(body_json(json!({"email": "jane@corp.com", "otp": "4242"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let mut flow = SignupFlow::new(client_for(&server)?);
        flow.wizard_mut().set_email("jane@corp.com")?;

        let SignupStep::VerifyEmail { mut challenge, .. } = flow.next().await? else {
            return Err(anyhow!("expected verification"));
        };
        assert_eq!(flow.wizard().verification(), VerificationStep::EmailSent);

        let notice = flow.confirm_email(&mut challenge, "4242").await?;
        assert_eq!(notice, EMAIL_VERIFIED_NOTICE);
        assert_eq!(flow.wizard().step(), Step::Identity);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_code_keeps_email_unverified() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/confirm-email"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({})))
            .mount(&server)
            .await;

        let mut flow = SignupFlow::new(client_for(&server)?);
        flow.wizard_mut().set_email("jane@corp.com")?;
        flow.wizard_mut().mark_email_sent();
        let mut challenge = OtpChallenge::open("jane@corp.com", ChallengeContext::SignupEmail);

        let failure = flow
            .confirm_email(&mut challenge, "0000")
            .await
            .err()
            .ok_or_else(|| anyhow!("expected failure"))?;
        assert_eq!(failure.to_string(), "Invalid verification code");
        assert!(challenge.is_open());
        assert_eq!(flow.wizard().step(), Step::Email);
        Ok(())
    }

    #[tokio::test]
    async fn submit_posts_draft_and_discards_it() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/signup"))
            .and(body_partial_json(json!({
                "email": "jane@corp.com",
                "firstName": "Jane",
                "workRole": "Data Steward",
                "emailVerified": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut flow = SignupFlow::with_wizard(client_for(&server)?, completed_wizard("jane@corp.com"));
        let SignupStep::ReadyToSubmit(request) = flow.next().await? else {
            return Err(anyhow!("expected request"));
        };

        let completed = flow.submit(request).await?;
        assert_eq!(completed.notice, ACCOUNT_CREATED_NOTICE);
        assert_eq!(completed.navigation, Navigation::now(Route::Login));
        assert_eq!(flow.wizard().draft().email(), "");
        assert_eq!(flow.wizard().step(), Step::Email);
        Ok(())
    }

    #[tokio::test]
    async fn failed_submit_keeps_draft() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/users/signup"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "User already exists"})),
            )
            .mount(&server)
            .await;

        let mut flow = SignupFlow::with_wizard(client_for(&server)?, completed_wizard("jane@corp.com"));
        let SignupStep::ReadyToSubmit(request) = flow.next().await? else {
            return Err(anyhow!("expected request"));
        };

        let err = flow
            .submit(request)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected failure"))?;
        assert_eq!(err.to_string(), "User already exists");
        assert_eq!(flow.wizard().draft().email(), "jane@corp.com");
        assert_eq!(flow.wizard().step(), Step::Credentials);
        Ok(())
    }
}

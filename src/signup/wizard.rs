//! Four-step signup state machine. It holds the draft and the email
//! verification status and decides transitions; it never touches the
//! network. [`super::flow::SignupFlow`] performs the requests the
//! transitions call for.

use crate::{
    auth::AuthError,
    signup::{
        roles::{self, OTHER_WORK_ROLE},
        validation::{country_from_phone, is_valid_phone, validate_work_email},
    },
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    #[default]
    Email = 1,
    Identity = 2,
    Professional = 3,
    Credentials = 4,
}

pub const STEP_COUNT: u8 = 4;

impl Step {
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Completion percentage shown in the progress bar.
    #[must_use]
    pub fn progress(self) -> u8 {
        let percent = u16::from(self.number()) * 100 / u16::from(STEP_COUNT);
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Step::Email => "Let's get started",
            Step::Identity => "Personal Information",
            Step::Professional => "Professional Details",
            Step::Credentials => "Security Setup",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Step::Email => "Begin with your work email",
            Step::Identity => "Tell us about yourself",
            Step::Professional => "Share your professional background",
            Step::Credentials => "Create a secure password",
        }
    }

    fn next(self) -> Self {
        match self {
            Step::Email => Step::Identity,
            Step::Identity => Step::Professional,
            Step::Professional | Step::Credentials => Step::Credentials,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            Step::Email => None,
            Step::Identity => Some(Step::Email),
            Step::Professional => Some(Step::Identity),
            Step::Credentials => Some(Step::Professional),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Step {} of {}", self.number(), STEP_COUNT)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerificationStep {
    #[default]
    Initial,
    EmailSent,
    Verified,
}

/// Everything typed into the wizard so far. The email lives on the wizard
/// side of the API because changing it interacts with verification.
#[derive(Clone, Debug, Default)]
pub struct SignupDraft {
    email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    phone: String,
    pub company: String,
    pub industry: String,
    pub work_role: String,
    pub other_work_role: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    country: String,
}

impl SignupDraft {
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Sets the phone number; a non-empty number also sets the country.
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
        if let Some(country) = country_from_phone(&self.phone) {
            self.country = country;
        }
    }
}

/// Body of `POST /api/users/signup`. Only [`SignupWizard::advance`] can build
/// one, after every step (email verification included) has passed.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    first_name: String,
    middle_name: String,
    last_name: String,
    phone: String,
    company: String,
    industry: String,
    password: String,
    confirm_password: String,
    work_role: String,
    other_work_role: String,
    country: String,
    email: String,
    email_verified: bool,
}

impl SignupRequest {
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn work_role(&self) -> &str {
        &self.work_role
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("work_role", &self.work_role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Advance {
    /// The step changed.
    Moved(Step),
    /// Step 1 passed local checks; a verification code must be requested.
    VerifyEmail,
    /// Step 4 passed; the request may be submitted.
    ReadyToSubmit(SignupRequest),
}

#[derive(Clone, Debug, Default)]
pub struct SignupWizard {
    draft: SignupDraft,
    step: Step,
    verification: VerificationStep,
}

impl SignupWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wizard for an email the identity provider already verified.
    #[must_use]
    pub fn with_verified_email(email: impl Into<String>) -> Self {
        Self {
            draft: SignupDraft {
                email: email.into().trim().to_string(),
                ..SignupDraft::default()
            },
            step: Step::Email,
            verification: VerificationStep::Verified,
        }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn verification(&self) -> VerificationStep {
        self.verification
    }

    #[must_use]
    pub fn draft(&self) -> &SignupDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut SignupDraft {
        &mut self.draft
    }

    /// # Errors
    /// Returns `AuthError::Validation` once the email has been verified.
    pub fn set_email(&mut self, email: &str) -> Result<(), AuthError> {
        if self.verification == VerificationStep::Verified {
            return Err(AuthError::Validation(
                "Verified email cannot be changed".to_string(),
            ));
        }

        let email = email.trim();
        if self.verification == VerificationStep::EmailSent && email != self.draft.email {
            self.verification = VerificationStep::Initial;
        }
        self.draft.email = email.to_string();
        Ok(())
    }

    pub fn mark_email_sent(&mut self) {
        if self.verification == VerificationStep::Initial {
            self.verification = VerificationStep::EmailSent;
        }
    }

    pub fn mark_email_verified(&mut self) {
        self.verification = VerificationStep::Verified;
        if self.step == Step::Email {
            self.step = Step::Identity;
        }
    }

    /// Validates the current step and moves forward when it passes.
    ///
    /// # Errors
    /// Returns `AuthError::Validation` with the step's message; the step is unchanged.
    pub fn advance(&mut self) -> Result<Advance, AuthError> {
        match self.step {
            Step::Email => {
                validate_work_email(&self.draft.email)?;
                match self.verification {
                    VerificationStep::Initial => return Ok(Advance::VerifyEmail),
                    VerificationStep::EmailSent => {
                        return Err(invalid("Please verify your email before continuing"))
                    }
                    VerificationStep::Verified => {}
                }
            }
            Step::Identity => {
                if is_blank(&self.draft.first_name) || is_blank(&self.draft.last_name) {
                    return Err(invalid("First name and last name are required"));
                }
                if !is_valid_phone(&self.draft.phone) {
                    return Err(invalid("Please enter a valid phone number"));
                }
            }
            Step::Professional => {
                if is_blank(&self.draft.company) || is_blank(&self.draft.work_role) {
                    return Err(invalid("Company and work role are required"));
                }
                if self.draft.work_role == OTHER_WORK_ROLE
                    && is_blank(&self.draft.other_work_role)
                {
                    return Err(invalid("Please specify your work role"));
                }
            }
            Step::Credentials => return self.ready_to_submit().map(Advance::ReadyToSubmit),
        }

        self.step = self.step.next();
        Ok(Advance::Moved(self.step))
    }

    /// Goes back one step; never forward.
    ///
    /// # Errors
    /// Returns `AuthError::Validation` on the first step.
    pub fn back(&mut self) -> Result<Step, AuthError> {
        let previous = self
            .step
            .previous()
            .ok_or_else(|| invalid("Already at the first step"))?;
        self.step = previous;
        Ok(previous)
    }

    fn ready_to_submit(&self) -> Result<SignupRequest, AuthError> {
        let password = self.draft.password.expose_secret();
        let confirm = self.draft.confirm_password.expose_secret();
        if password.is_empty() || confirm.is_empty() {
            return Err(invalid("Both password fields are required"));
        }
        if password != confirm {
            return Err(invalid("Passwords must match"));
        }
        if self.verification != VerificationStep::Verified {
            return Err(invalid("Email verification required"));
        }

        let draft = &self.draft;
        Ok(SignupRequest {
            first_name: draft.first_name.clone(),
            middle_name: draft.middle_name.clone(),
            last_name: draft.last_name.clone(),
            phone: draft.phone.clone(),
            company: draft.company.clone(),
            industry: draft.industry.clone(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            work_role: roles::resolve(&draft.work_role, &draft.other_work_role).to_string(),
            other_work_role: draft.other_work_role.clone(),
            country: draft.country.clone(),
            email: draft.email.clone(),
            email_verified: true,
        })
    }
}

fn invalid(message: &str) -> AuthError {
    AuthError::Validation(message.to_string())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use serde_json::json;

    fn message(result: Result<Advance, AuthError>) -> Option<String> {
        result.err().map(|err| err.to_string())
    }

    /// Wizard on step 4 with every field filled in.
    pub(crate) fn completed_wizard(email: &str) -> SignupWizard {
        let mut wizard = SignupWizard::with_verified_email(email);
        let draft = wizard.draft_mut();
        draft.first_name = "Jane".to_string();
        draft.last_name = "Doe".to_string();
        draft.set_phone("+1 4155552671");
        draft.company = "Corp".to_string();
        draft.work_role = "other".to_string();
        draft.other_work_role = "Data Steward".to_string();
        draft.password = SecretString::from("Str0ng!pass".to_string());
        draft.confirm_password = SecretString::from("Str0ng!pass".to_string());
        wizard.step = Step::Credentials;
        wizard
    }

    #[test]
    fn step_metadata() {
        assert_eq!(Step::Email.progress(), 25);
        assert_eq!(Step::Identity.progress(), 50);
        assert_eq!(Step::Professional.progress(), 75);
        assert_eq!(Step::Credentials.progress(), 100);
        assert_eq!(Step::Professional.title(), "Professional Details");
        assert_eq!(Step::Identity.description(), "Tell us about yourself");
        assert_eq!(Step::Identity.to_string(), "Step 2 of 4");
    }

    #[test]
    fn personal_email_blocks_step_one() -> Result<()> {
        let mut wizard = SignupWizard::new();
        wizard.set_email("user@yahoo.com")?;
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Please use your work email address. Personal email domains are not accepted.")
        );
        assert_eq!(wizard.step(), Step::Email);
        Ok(())
    }

    #[test]
    fn step_one_requires_verification() -> Result<()> {
        let mut wizard = SignupWizard::new();
        wizard.set_email("jane@corp.com")?;
        assert!(matches!(wizard.advance()?, Advance::VerifyEmail));

        wizard.mark_email_sent();
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Please verify your email before continuing")
        );

        wizard.mark_email_verified();
        assert_eq!(wizard.step(), Step::Identity);
        assert!(wizard.set_email("other@corp.com").is_err());
        Ok(())
    }

    #[test]
    fn changing_email_after_send_resets_verification() -> Result<()> {
        let mut wizard = SignupWizard::new();
        wizard.set_email("jane@corp.com")?;
        wizard.mark_email_sent();
        wizard.set_email("jane@corp.com")?;
        assert_eq!(wizard.verification(), VerificationStep::EmailSent);
        wizard.set_email("john@corp.com")?;
        assert_eq!(wizard.verification(), VerificationStep::Initial);
        Ok(())
    }

    #[test]
    fn google_prefill_skips_verification() -> Result<()> {
        let mut wizard = SignupWizard::with_verified_email("jane@corp.com");
        assert!(matches!(wizard.advance()?, Advance::Moved(Step::Identity)));
        Ok(())
    }

    #[test]
    fn identity_and_professional_messages() -> Result<()> {
        let mut wizard = SignupWizard::with_verified_email("jane@corp.com");
        wizard.advance()?;

        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("First name and last name are required")
        );
        wizard.draft_mut().first_name = "Jane".to_string();
        wizard.draft_mut().last_name = "Doe".to_string();
        wizard.draft_mut().set_phone("555");
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Please enter a valid phone number")
        );
        wizard.draft_mut().set_phone("+44 20 7946 0958");
        assert_eq!(wizard.draft().country(), "44");
        assert!(matches!(wizard.advance()?, Advance::Moved(Step::Professional)));

        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Company and work role are required")
        );
        wizard.draft_mut().company = "Corp".to_string();
        wizard.draft_mut().work_role = "other".to_string();
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Please specify your work role")
        );
        wizard.draft_mut().other_work_role = "Data Steward".to_string();
        assert!(matches!(wizard.advance()?, Advance::Moved(Step::Credentials)));
        Ok(())
    }

    #[test]
    fn credentials_messages() {
        let mut wizard = completed_wizard("jane@corp.com");
        wizard.draft_mut().confirm_password = SecretString::default();
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Both password fields are required")
        );
        wizard.draft_mut().confirm_password = SecretString::from("different".to_string());
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Passwords must match")
        );
    }

    #[test]
    fn unverified_email_cannot_reach_submission() -> Result<()> {
        let mut wizard = completed_wizard("jane@corp.com");
        wizard.verification = VerificationStep::EmailSent;
        assert_eq!(
            message(wizard.advance()).as_deref(),
            Some("Email verification required")
        );
        Ok(())
    }

    #[test]
    fn request_resolves_other_role() -> Result<()> {
        let mut wizard = completed_wizard("jane@corp.com");
        let Advance::ReadyToSubmit(request) = wizard.advance()? else {
            return Err(anyhow!("expected request"));
        };
        let body = serde_json::to_value(&request)?;
        assert_eq!(body["email"], json!("jane@corp.com"));
        assert_eq!(body["workRole"], json!("Data Steward"));
        assert_eq!(body["otherWorkRole"], json!("Data Steward"));
        assert_eq!(body["emailVerified"], json!(true));
        assert_eq!(body["country"], json!("1"));
        assert!(!format!("{request:?}").contains("Str0ng"));
        Ok(())
    }

    #[test]
    fn back_never_moves_forward() -> Result<()> {
        let mut wizard = completed_wizard("jane@corp.com");
        assert_eq!(wizard.back()?, Step::Professional);
        assert_eq!(wizard.back()?, Step::Identity);
        assert_eq!(wizard.back()?, Step::Email);
        assert!(wizard.back().is_err());
        assert_eq!(wizard.step(), Step::Email);
        Ok(())
    }
}

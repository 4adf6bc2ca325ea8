//! Account creation: a pure four-step wizard ([`wizard`]) driven by a flow
//! that performs the email verification and signup requests ([`flow`]).

pub mod flow;
pub mod roles;
pub mod validation;
pub mod wizard;

pub use flow::{SignupCompleted, SignupFlow, SignupStep};
pub use wizard::{Advance, SignupDraft, SignupRequest, SignupWizard, Step, VerificationStep};

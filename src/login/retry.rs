use tracing::{debug, info, warn};

use crate::i18n;
use crate::login::credentials::{CredentialCollector, CredentialOverrides};
use crate::login::error::{AuthFailure, LoginError};
use crate::login::prompt_plan::PromptPlan;
use crate::platform::{AuthError, GrantType, IdentityService};
use crate::ui::Ui;

pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Collecting,
    Authenticating,
    Retrying,
    Success,
    Fatal,
}

/// Classification of one authenticate call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure(String),
    FatalFailure(String),
}

impl AttemptOutcome {
    pub fn classify(result: &Result<(), AuthError>) -> Self {
        match result {
            Ok(()) => AttemptOutcome::Success,
            Err(AuthError::Unauthorized(_)) => AttemptOutcome::RetryableFailure(i18n::tr(
                "login.credentials_rejected",
                "Credentials were rejected, please try again.",
            )),
            Err(AuthError::AccountLocked(message)) | Err(AuthError::Other(message)) => {
                AttemptOutcome::FatalFailure(message.clone())
            }
        }
    }
}

pub fn attempt_budget(grant_type: GrantType) -> u32 {
    match grant_type {
        GrantType::ClientCredentials => 1,
        GrantType::Password | GrantType::SsoPasscode => MAX_ATTEMPTS,
    }
}

pub struct AuthenticationRetryLoop<'a, I: IdentityService> {
    identity: &'a mut I,
    overrides: &'a CredentialOverrides,
    origin: Option<&'a str>,
    grant_type: GrantType,
    sso_mode: bool,
    binary_name: &'a str,
    state: LoopState,
}

impl<'a, I: IdentityService> AuthenticationRetryLoop<'a, I> {
    pub fn new(
        identity: &'a mut I,
        overrides: &'a CredentialOverrides,
        origin: Option<&'a str>,
        grant_type: GrantType,
        sso_mode: bool,
        binary_name: &'a str,
    ) -> Self {
        Self {
            identity,
            overrides,
            origin,
            grant_type,
            sso_mode,
            binary_name,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn run(&mut self, ui: &mut Ui) -> Result<(), LoginError> {
        if self.grant_type == GrantType::ClientCredentials {
            self.transition(LoopState::Fatal);
            return Err(LoginError::ServiceAccountLoggedIn {
                binary_name: self.binary_name.to_string(),
            });
        }

        let prompts = self.identity.fetch_prompts(self.grant_type, self.origin);
        let plan = PromptPlan::build(&prompts, self.sso_mode);
        debug!(prompts = prompts.len(), planned = plan.len(), "built prompt plan");
        let collector = CredentialCollector::new(&plan, self.overrides);

        let budget = attempt_budget(self.grant_type);
        for attempt in 1..=budget {
            self.transition(LoopState::Collecting);
            let credentials = match collector.collect(ui, attempt) {
                Ok(credentials) => credentials,
                Err(err) => {
                    self.transition(LoopState::Fatal);
                    return Err(LoginError::Authentication(AuthFailure::PromptInput(err)));
                }
            };

            self.transition(LoopState::Authenticating);
            ui.display_newline();
            ui.display_text(&i18n::tr("login.authenticating", "Authenticating..."));
            let reply = self
                .identity
                .authenticate(&credentials, self.origin, self.grant_type);
            drop(credentials);
            ui.display_warnings(&reply.warnings);

            match AttemptOutcome::classify(&reply.result) {
                AttemptOutcome::Success => {
                    info!(attempt, "authenticated");
                    ui.display_ok();
                    ui.display_newline();
                    self.transition(LoopState::Success);
                    return Ok(());
                }
                AttemptOutcome::RetryableFailure(message) => {
                    warn!(attempt, budget, "credentials rejected");
                    ui.display_error(&message);
                    if attempt < budget {
                        self.transition(LoopState::Retrying);
                    }
                }
                AttemptOutcome::FatalFailure(message) => {
                    warn!(attempt, "authentication failed without retry");
                    ui.display_error(&message);
                    self.transition(LoopState::Fatal);
                    let failure = match reply.result {
                        Err(AuthError::AccountLocked(message)) => AuthFailure::AccountLocked(message),
                        _ => AuthFailure::Unclassified(message),
                    };
                    return Err(LoginError::Authentication(failure));
                }
            }
        }

        self.transition(LoopState::Fatal);
        Err(LoginError::Authentication(AuthFailure::InvalidCredentials))
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "authentication state");
        self.state = next;
    }
}

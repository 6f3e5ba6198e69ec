//! Login: credential prompting, the bounded authentication loop, and org/space
//! targeting.
//!
//! [`LoginWorkflow`] is the core and only talks to the [`Ui`] and the platform
//! traits. [`command::LoginCommand`] wraps it with the configuration updates
//! and the status summary shown after every login.

pub mod command;
pub mod credentials;
pub mod error;
pub mod prompt_plan;
pub mod retry;
pub mod summary;
pub mod target;

use tracing::{debug, info};

use crate::platform::{
    ApiError, Candidate, GrantType, IdentityService, Reply, ResourceDirectory,
};
use crate::ui::Ui;

pub use command::{LoginCommand, SessionSource};
pub use credentials::{CredentialOverrides, CredentialValue, Credentials};
pub use error::{AuthFailure, LoginError};
pub use prompt_plan::PromptPlan;
pub use retry::{AttemptOutcome, AuthenticationRetryLoop, LoopState, MAX_ATTEMPTS};
pub use target::{Resolution, TargetKind, TargetResolver};

#[derive(Clone, Debug, Default)]
pub struct LoginRequest {
    pub overrides: CredentialOverrides,
    pub origin: Option<String>,
    pub organization: Option<String>,
    pub space: Option<String>,
    pub sso: bool,
    /// Grant type recorded by the previous login.
    pub grant_type: GrantType,
}

impl LoginRequest {
    pub fn sso_mode(&self) -> bool {
        self.sso || self.overrides.passcode.is_some()
    }

    pub fn effective_grant_type(&self) -> GrantType {
        match self.grant_type {
            GrantType::ClientCredentials => GrantType::ClientCredentials,
            _ if self.sso_mode() => GrantType::SsoPasscode,
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), LoginError> {
        if self.sso && self.overrides.passcode.is_some() {
            return Err(LoginError::ArgumentCombination(vec![
                "--sso-passcode".to_string(),
                "--sso".to_string(),
            ]));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct LoginReport {
    pub authenticated: bool,
    pub organization: Resolution,
    pub space: Resolution,
    pub error: Option<LoginError>,
}

impl Default for LoginReport {
    fn default() -> Self {
        Self {
            authenticated: false,
            organization: Resolution::Skipped,
            space: Resolution::Skipped,
            error: None,
        }
    }
}

impl LoginReport {
    pub fn into_result(self) -> Result<Self, LoginError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

pub struct LoginWorkflow<'a, P> {
    ui: &'a mut Ui,
    platform: &'a mut P,
    binary_name: &'a str,
}

impl<'a, P> LoginWorkflow<'a, P>
where
    P: IdentityService + ResourceDirectory,
{
    pub fn new(ui: &'a mut Ui, platform: &'a mut P, binary_name: &'a str) -> Self {
        Self {
            ui,
            platform,
            binary_name,
        }
    }

    pub fn run(&mut self, request: &LoginRequest) -> LoginReport {
        let mut report = LoginReport::default();
        if let Err(err) = request.validate() {
            report.error = Some(err);
            return report;
        }

        let grant_type = request.effective_grant_type();
        debug!(grant_type = grant_type.as_str(), sso = request.sso_mode(), "starting login");
        let mut auth = AuthenticationRetryLoop::new(
            self.platform,
            &request.overrides,
            request.origin.as_deref(),
            grant_type,
            request.sso_mode(),
            self.binary_name,
        );
        if let Err(err) = auth.run(self.ui) {
            report.error = Some(err);
            return report;
        }
        report.authenticated = true;

        report.organization = match self.target_organization(request.organization.as_deref()) {
            Ok(resolution) => resolution,
            Err(err) => {
                report.error = Some(err);
                return report;
            }
        };
        if let Resolution::NotFound(name) = &report.organization {
            report.error = Some(LoginError::TargetNotFound {
                kind: TargetKind::Org,
                name: name.clone(),
            });
            return report;
        }

        let Some(org) = report.organization.selected().cloned() else {
            return report;
        };
        info!(org = %org.name, "organization targeted");

        report.space = match self.target_space(&org, request.space.as_deref()) {
            Ok(resolution) => resolution,
            Err(err) => {
                report.error = Some(err);
                return report;
            }
        };
        if let Resolution::NotFound(name) = &report.space {
            report.error = Some(LoginError::TargetNotFound {
                kind: TargetKind::Space,
                name: name.clone(),
            });
        }
        report
    }

    fn target_organization(&mut self, explicit: Option<&str>) -> Result<Resolution, LoginError> {
        if let Some(name) = explicit {
            let reply = self.platform.organization_by_name(name);
            let org = self.surface(reply)?;
            return Ok(Resolution::Selected(org));
        }
        let reply = self.platform.list_organizations();
        let orgs = self.surface(reply)?;
        Ok(TargetResolver::organizations().resolve(self.ui, &orgs))
    }

    fn target_space(
        &mut self,
        org: &Candidate,
        explicit: Option<&str>,
    ) -> Result<Resolution, LoginError> {
        if let Some(name) = explicit {
            let reply = self.platform.space_by_name_and_org(name, &org.guid);
            let space = self.surface(reply)?;
            return Ok(Resolution::Selected(space));
        }
        let reply = self.platform.list_spaces(&org.guid);
        let spaces = self.surface(reply)?;
        Ok(TargetResolver::spaces(org).resolve(self.ui, &spaces))
    }

    fn surface<T>(&mut self, reply: Reply<T, ApiError>) -> Result<T, LoginError> {
        self.ui.display_warnings(&reply.warnings);
        reply.result.map_err(LoginError::from)
    }
}

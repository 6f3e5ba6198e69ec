use tracing::debug;

use crate::i18n;
use crate::login::summary::display_status;
use crate::login::{LoginError, LoginReport, LoginRequest, LoginWorkflow, Resolution};
use crate::platform::{GrantType, IdentityService, ResourceDirectory};
use crate::settings::{CliSettings, UserSession};
use crate::ui::Ui;

/// Session details the identity service holds after a successful login.
pub trait SessionSource {
    fn session(&self) -> Option<UserSession>;
}

/// `login` against an already targeted endpoint: runs the workflow, records
/// the outcome in `settings` and prints the status summary.
pub struct LoginCommand<'a, P> {
    ui: &'a mut Ui,
    platform: &'a mut P,
    settings: &'a mut CliSettings,
    binary_name: &'a str,
}

impl<'a, P> LoginCommand<'a, P>
where
    P: IdentityService + ResourceDirectory + SessionSource,
{
    pub fn new(
        ui: &'a mut Ui,
        platform: &'a mut P,
        settings: &'a mut CliSettings,
        binary_name: &'a str,
    ) -> Self {
        Self {
            ui,
            platform,
            settings,
            binary_name,
        }
    }

    pub fn execute(&mut self, mut request: LoginRequest) -> Result<LoginReport, LoginError> {
        request.validate()?;
        request.grant_type = self.settings.identity.grant_type;

        if request.grant_type == GrantType::Password && self.settings.identity.has_custom_client() {
            self.ui.display_warning(&i18n::trf(
                "login.deprecated_client_credentials",
                "Deprecation warning: Manually writing your client credentials to the config file is deprecated and will be removed in the future. For similar functionality, please use the '{} auth --client-credentials' command instead.",
                &[self.binary_name],
            ));
        }

        if request.grant_type != GrantType::ClientCredentials {
            self.settings.unset_user();
        }

        let report = LoginWorkflow::new(self.ui, self.platform, self.binary_name).run(&request);
        self.record(&report);
        display_status(self.ui, self.settings, self.binary_name);
        report.into_result()
    }

    fn record(&mut self, report: &LoginReport) {
        if !report.authenticated {
            return;
        }
        self.settings.user = self.platform.session();
        self.settings.identity.grant_type = GrantType::Password;
        if let Resolution::Selected(org) = &report.organization {
            self.settings.organization = Some(org.clone());
        }
        if let Resolution::Selected(space) = &report.space {
            self.settings.space = Some(space.clone());
        }
        debug!(
            org = self.settings.organization.is_some(),
            space = self.settings.space.is_some(),
            "recorded login target"
        );
    }
}

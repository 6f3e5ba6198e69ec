use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::endpoint;
use crate::i18n;
use crate::login::{CredentialOverrides, CredentialValue, LoginCommand, LoginRequest};
use crate::logging;
use crate::logout::logout;
use crate::platform::HttpPlatform;
use crate::settings::{load_settings, save_settings};
use crate::ui::Ui;

pub const BINARY_NAME: &str = "tenantctl";

#[derive(Parser)]
#[command(name = "tenantctl")]
#[command(about = "Log in to a multi-tenant platform and target an org and space", version)]
pub struct Cli {
    #[arg(long, global = true, help = "CLI locale (for translated output).")]
    locale: Option<String>,
    #[arg(long, global = true, help = "Write debug logs to stderr.")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Log in and target an org and space")]
    Login(LoginArgs),
    #[command(about = "Log out and forget the current target")]
    Logout,
}

#[derive(Parser)]
struct LoginArgs {
    #[arg(short = 'a', value_name = "API_URL", help = "API endpoint (e.g. https://api.example.com)")]
    api: Option<String>,
    #[arg(short = 'u', value_name = "USERNAME")]
    username: Option<String>,
    #[arg(short = 'p', value_name = "PASSWORD")]
    password: Option<String>,
    #[arg(short = 'o', value_name = "ORG")]
    org: Option<String>,
    #[arg(short = 's', value_name = "SPACE")]
    space: Option<String>,
    #[arg(long, help = "Identity provider to authenticate against (password logins only)")]
    origin: Option<String>,
    #[arg(long, help = "Prompt for a one-time passcode to log in")]
    sso: bool,
    #[arg(long = "sso-passcode", value_name = "PASSCODE", help = "One-time passcode")]
    sso_passcode: Option<String>,
    #[arg(long, help = "Skip verification of the API endpoint's certificate. Not recommended!")]
    skip_ssl_validation: bool,
}

impl LoginArgs {
    fn request(&self) -> LoginRequest {
        LoginRequest {
            overrides: CredentialOverrides {
                username: self.username.clone(),
                password: self.password.clone().map(CredentialValue::new),
                passcode: self.sso_passcode.clone().map(CredentialValue::new),
            },
            origin: self.origin.clone(),
            organization: self.org.clone(),
            space: self.space.clone(),
            sso: self.sso,
            grant_type: Default::default(),
        }
    }

    fn run(self, ui: &mut Ui) -> anyhow::Result<()> {
        let request = self.request();
        request.validate()?;

        let mut settings = load_settings().context("Error reading config")?;
        let endpoint = endpoint::resolve(ui, self.api.as_deref(), settings.target.as_deref())?;
        ui.display_text(&i18n::trf("login.api_endpoint", "API endpoint: {}", &[endpoint.as_str()]));
        ui.display_newline();

        let skip_ssl = self.skip_ssl_validation || settings.skip_ssl_validation;
        let mut platform = HttpPlatform::connect(&endpoint, skip_ssl, &settings.identity)
            .with_context(|| {
                i18n::trf(
                    "login.error.target_api",
                    "Unable to target API endpoint {}. If it uses a self-signed certificate, use '{} login --skip-ssl-validation'.",
                    &[endpoint.as_str(), BINARY_NAME],
                )
            })?;
        settings.set_target(
            &endpoint,
            platform.api_version().map(str::to_string),
            skip_ssl,
        );
        settings.identity.authorization_endpoint =
            Some(platform.authorization_endpoint().to_string());

        let outcome =
            LoginCommand::new(ui, &mut platform, &mut settings, BINARY_NAME).execute(request);
        save_settings(&settings).context("Error writing config")?;
        outcome?;
        Ok(())
    }
}

fn run_logout(ui: &mut Ui) -> anyhow::Result<()> {
    let mut settings = load_settings().context("Error reading config")?;
    let mut platform = settings.target.as_deref().and_then(|api| {
        HttpPlatform::from_settings(
            api,
            settings.skip_ssl_validation,
            &settings.identity,
            settings.user.clone(),
        )
        .inspect_err(|err| debug!(%err, "logging out without revoking tokens"))
        .ok()
    });
    logout(ui, platform.as_mut(), &mut settings);
    save_settings(&settings).context("Error writing config")?;
    Ok(())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        logging::init_tracing(self.verbose);
        if let Some(locale) = self.locale.as_deref() {
            i18n::set_locale(i18n::select_locale(Some(locale)));
        }
        let mut ui = Ui::terminal();
        match self.command {
            Command::Login(args) => args.run(&mut ui),
            Command::Logout => run_logout(&mut ui),
        }
    }
}

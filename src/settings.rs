use std::path::{Path, PathBuf};

use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::platform::{Candidate, GrantType};

pub const CONFIG_DIR_ENV: &str = "TENANTCTL_CONFIG_DIR";
pub const DEFAULT_CLIENT_ID: &str = "cf";
pub const DEFAULT_CLIENT_SECRET: &str = "";

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CliSettings {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub skip_ssl_validation: bool,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub user: Option<UserSession>,
    #[serde(default)]
    pub organization: Option<Candidate>,
    #[serde(default)]
    pub space: Option<Candidate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentitySettings {
    #[serde(default)]
    pub grant_type: GrantType,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub authorization_endpoint: Option<String>,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            grant_type: GrantType::default(),
            client_id: default_client_id(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            authorization_endpoint: None,
        }
    }
}

impl IdentitySettings {
    pub fn has_custom_client(&self) -> bool {
        self.client_id != DEFAULT_CLIENT_ID || self.client_secret != DEFAULT_CLIENT_SECRET
    }
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

/// Tokens of the logged-in user. Never logged.
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserSession {
    pub name: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("name", &self.name)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

impl CliSettings {
    /// Records the API endpoint. Moving to another endpoint, or changing the
    /// certificate check, forgets the session and targets tied to the old one.
    pub fn set_target(&mut self, endpoint: &str, api_version: Option<String>, skip_ssl: bool) {
        let endpoint_changed = self.target.as_deref() != Some(endpoint);
        if endpoint_changed {
            self.identity.authorization_endpoint = None;
        }
        if endpoint_changed || self.skip_ssl_validation != skip_ssl {
            self.unset_user();
        }
        self.target = Some(endpoint.to_string());
        self.api_version = api_version;
        self.skip_ssl_validation = skip_ssl;
    }

    pub fn unset_user(&mut self) {
        self.user = None;
        self.unset_org_and_space();
    }

    pub fn unset_org_and_space(&mut self) {
        self.organization = None;
        self.space = None;
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.name.as_str())
    }
}

pub fn load_settings() -> anyhow::Result<CliSettings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(CliSettings::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let settings: CliSettings = serde_yaml_bw::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(settings: &CliSettings) -> anyhow::Result<()> {
    let path = settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_yaml_bw::to_string(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_DIR_ENV) {
        return Ok(Path::new(&value).join("config.yaml"));
    }
    let dirs = ProjectDirs::from("", "tenantctl", "tenantctl")
        .ok_or_else(|| anyhow::anyhow!("unable to determine config directory"))?;
    Ok(dirs.config_dir().join("config.yaml"))
}

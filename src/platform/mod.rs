//! Contracts the login workflow consumes from the identity service and the
//! resource API.
//!
//! The workflow never talks to the network directly; it drives these traits.
//! [`http::HttpPlatform`] is the implementation the binary uses, tests use
//! scripted fakes.

pub mod http;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::login::credentials::Credentials;

pub use http::HttpPlatform;

pub type Warnings = Vec<String>;

/// Whether a prompt's answer is echoed while typing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Text,
    Secret,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub key: String,
    pub display_name: String,
    pub kind: PromptKind,
}

impl Prompt {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>, kind: PromptKind) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            kind,
        }
    }
}

/// Prompts keyed by name. Carries no order; see [`crate::login::prompt_plan`].
pub type PromptSet = HashMap<String, Prompt>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    #[default]
    Password,
    ClientCredentials,
    SsoPasscode,
}

impl GrantType {
    pub fn as_str(self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::SsoPasscode => "sso_passcode",
        }
    }
}

/// An organization or a space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub guid: String,
    pub name: String,
}

impl Candidate {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
        }
    }
}

/// Result of a collaborator call together with the warnings it produced.
///
/// Warnings are meaningful whether or not `result` is an error.
#[derive(Clone, Debug)]
pub struct Reply<T, E> {
    pub warnings: Warnings,
    pub result: Result<T, E>,
}

impl<T, E> Reply<T, E> {
    pub fn ok(value: T) -> Self {
        Self {
            warnings: Vec::new(),
            result: Ok(value),
        }
    }

    pub fn err(error: E) -> Self {
        Self {
            warnings: Vec::new(),
            result: Err(error),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.warnings = warnings.into_iter().map(Into::into).collect();
        self
    }
}

/// Failure classes of the identity service's authenticate operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    Unauthorized(String),
    AccountLocked(String),
    Other(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthorized(message)
            | AuthError::AccountLocked(message)
            | AuthError::Other(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for AuthError {}

/// Failure of a resource-API call, shown to the user as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    OrganizationNotFound(String),
    SpaceNotFound(String),
    Request(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::OrganizationNotFound(name) => {
                write!(f, "Organization '{name}' not found.")
            }
            ApiError::SpaceNotFound(name) => write!(f, "Space '{name}' not found."),
            ApiError::Request(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ApiError {}

pub trait IdentityService {
    fn fetch_prompts(&self, grant_type: GrantType, origin: Option<&str>) -> PromptSet;

    fn authenticate(
        &mut self,
        credentials: &Credentials,
        origin: Option<&str>,
        grant_type: GrantType,
    ) -> Reply<(), AuthError>;

    fn revoke(&mut self) -> Result<(), AuthError>;
}

pub trait ResourceDirectory {
    fn list_organizations(&self) -> Reply<Vec<Candidate>, ApiError>;

    fn list_spaces(&self, org_guid: &str) -> Reply<Vec<Candidate>, ApiError>;

    fn organization_by_name(&self, name: &str) -> Reply<Candidate, ApiError>;

    fn space_by_name_and_org(&self, name: &str, org_guid: &str) -> Reply<Candidate, ApiError>;
}

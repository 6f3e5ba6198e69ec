use std::{fmt, io};

use crate::i18n;
use crate::login::target::TargetKind;
use crate::platform::ApiError;

/// Why the authentication loop gave up. Every variant is reported to the user
/// as the same generic message; the detail has already been displayed.
#[derive(Debug)]
pub enum AuthFailure {
    PromptInput(io::Error),
    InvalidCredentials,
    AccountLocked(String),
    Unclassified(String),
}

/// Terminal error of a login run. A run produces at most one.
#[derive(Debug)]
pub enum LoginError {
    ArgumentCombination(Vec<String>),
    ServiceAccountLoggedIn { binary_name: String },
    Authentication(AuthFailure),
    TargetNotFound { kind: TargetKind, name: String },
    Api(ApiError),
}

impl LoginError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, LoginError::Authentication(_))
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::ArgumentCombination(args) => write!(
                f,
                "{}",
                i18n::trf(
                    "login.error.argument_combination",
                    "Incorrect Usage: The following arguments cannot be used together: {}",
                    &[args.join(", ").as_str()]
                )
            ),
            LoginError::ServiceAccountLoggedIn { binary_name } => write!(
                f,
                "{}",
                i18n::trf(
                    "login.error.service_account",
                    "Service account currently logged in. Use '{} logout' to log out service account and try again.",
                    &[binary_name.as_str()]
                )
            ),
            LoginError::Authentication(_) => write!(
                f,
                "{}",
                i18n::tr("login.error.unable_to_authenticate", "Unable to authenticate.")
            ),
            LoginError::TargetNotFound { kind, name } => match kind {
                TargetKind::Org => write!(f, "{}", ApiError::OrganizationNotFound(name.clone())),
                TargetKind::Space => write!(f, "{}", ApiError::SpaceNotFound(name.clone())),
            },
            LoginError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LoginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoginError::Authentication(AuthFailure::PromptInput(err)) => Some(err),
            LoginError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        LoginError::Api(err)
    }
}

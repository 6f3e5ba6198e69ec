#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use tenantctl::login::{Credentials, SessionSource};
use tenantctl::platform::{
    ApiError, AuthError, Candidate, GrantType, IdentityService, Prompt, PromptKind, PromptSet,
    Reply, ResourceDirectory,
};
use tenantctl::settings::UserSession;

/// One recorded authenticate call.
#[derive(Clone, Debug)]
pub struct AuthCall {
    pub credentials: Vec<(String, String)>,
    pub origin: Option<String>,
    pub grant_type: GrantType,
}

impl AuthCall {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.credentials
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.credentials.iter().map(|(key, _)| key.as_str()).collect()
    }
}

/// Scripted identity service and resource directory. Authenticate replies
/// are consumed in order; once the script runs out every call succeeds.
pub struct FakePlatform {
    pub prompts: PromptSet,
    pub auth_replies: VecDeque<Reply<(), AuthError>>,
    pub auth_calls: Vec<AuthCall>,
    pub prompt_requests: RefCell<Vec<(GrantType, Option<String>)>>,
    pub organizations: Reply<Vec<Candidate>, ApiError>,
    pub spaces: Reply<Vec<Candidate>, ApiError>,
    pub space_listings: RefCell<Vec<String>>,
    pub org_lookups: RefCell<Vec<String>>,
    pub space_lookups: RefCell<Vec<(String, String)>>,
    pub lookup_warnings: Vec<String>,
    pub revoke_calls: usize,
    pub user_name: String,
    authenticated: bool,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            prompts: prompt_set(&[
                ("username", "Username", PromptKind::Text),
                ("password", "Password", PromptKind::Secret),
            ]),
            auth_replies: VecDeque::new(),
            auth_calls: Vec::new(),
            prompt_requests: RefCell::new(Vec::new()),
            organizations: Reply::ok(Vec::new()),
            spaces: Reply::ok(Vec::new()),
            space_listings: RefCell::new(Vec::new()),
            org_lookups: RefCell::new(Vec::new()),
            space_lookups: RefCell::new(Vec::new()),
            lookup_warnings: Vec::new(),
            revoke_calls: 0,
            user_name: "some-user".to_string(),
            authenticated: false,
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompts(mut self, prompts: &[(&str, &str, PromptKind)]) -> Self {
        self.prompts = prompt_set(prompts);
        self
    }

    pub fn with_auth_replies(mut self, replies: impl IntoIterator<Item = Reply<(), AuthError>>) -> Self {
        self.auth_replies = replies.into_iter().collect();
        self
    }

    pub fn with_orgs(mut self, names: &[&str]) -> Self {
        self.organizations = Reply::ok(candidates("org", names));
        self
    }

    pub fn with_spaces(mut self, names: &[&str]) -> Self {
        self.spaces = Reply::ok(candidates("space", names));
        self
    }

    pub fn auth_count(&self) -> usize {
        self.auth_calls.len()
    }
}

impl IdentityService for FakePlatform {
    fn fetch_prompts(&self, grant_type: GrantType, origin: Option<&str>) -> PromptSet {
        self.prompt_requests
            .borrow_mut()
            .push((grant_type, origin.map(str::to_string)));
        self.prompts.clone()
    }

    fn authenticate(
        &mut self,
        credentials: &Credentials,
        origin: Option<&str>,
        grant_type: GrantType,
    ) -> Reply<(), AuthError> {
        self.auth_calls.push(AuthCall {
            credentials: credentials
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            origin: origin.map(str::to_string),
            grant_type,
        });
        let reply = self.auth_replies.pop_front().unwrap_or_else(|| Reply::ok(()));
        if reply.result.is_ok() {
            self.authenticated = true;
        }
        reply
    }

    fn revoke(&mut self) -> Result<(), AuthError> {
        self.revoke_calls += 1;
        Ok(())
    }
}

impl ResourceDirectory for FakePlatform {
    fn list_organizations(&self) -> Reply<Vec<Candidate>, ApiError> {
        self.organizations.clone()
    }

    fn list_spaces(&self, org_guid: &str) -> Reply<Vec<Candidate>, ApiError> {
        self.space_listings.borrow_mut().push(org_guid.to_string());
        self.spaces.clone()
    }

    fn organization_by_name(&self, name: &str) -> Reply<Candidate, ApiError> {
        self.org_lookups.borrow_mut().push(name.to_string());
        let found = self
            .organizations
            .result
            .as_ref()
            .ok()
            .and_then(|orgs| orgs.iter().find(|org| org.name == name).cloned());
        match found {
            Some(org) => Reply::ok(org),
            None => Reply::err(ApiError::OrganizationNotFound(name.to_string())),
        }
        .with_warnings(self.lookup_warnings.clone())
    }

    fn space_by_name_and_org(&self, name: &str, org_guid: &str) -> Reply<Candidate, ApiError> {
        self.space_lookups
            .borrow_mut()
            .push((name.to_string(), org_guid.to_string()));
        let found = self
            .spaces
            .result
            .as_ref()
            .ok()
            .and_then(|spaces| spaces.iter().find(|space| space.name == name).cloned());
        match found {
            Some(space) => Reply::ok(space),
            None => Reply::err(ApiError::SpaceNotFound(name.to_string())),
        }
        .with_warnings(self.lookup_warnings.clone())
    }
}

impl SessionSource for FakePlatform {
    fn session(&self) -> Option<UserSession> {
        self.authenticated.then(|| UserSession {
            name: self.user_name.clone(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        })
    }
}

pub fn prompt_set(prompts: &[(&str, &str, PromptKind)]) -> PromptSet {
    prompts
        .iter()
        .map(|(key, name, kind)| (key.to_string(), Prompt::new(*key, *name, *kind)))
        .collect()
}

/// Candidates named `names`, with guids `<prefix>-guid-<position>`.
pub fn candidates(prefix: &str, names: &[&str]) -> Vec<Candidate> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| Candidate::new(format!("{prefix}-guid-{}", index + 1), *name))
        .collect()
}

pub fn unauthorized() -> Reply<(), AuthError> {
    Reply::err(AuthError::Unauthorized("Bad credentials".to_string()))
}

//! Blocking HTTP implementation of the platform traits.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use ureq::Agent;
use ureq::http::HeaderMap;
use ureq::tls::TlsConfig;

use crate::login::command::SessionSource;
use crate::login::credentials::Credentials;
use crate::platform::{
    ApiError, AuthError, Candidate, GrantType, IdentityService, Prompt, PromptKind, PromptSet,
    Reply, ResourceDirectory, Warnings,
};
use crate::settings::{IdentitySettings, UserSession};

const WARNINGS_HEADER: &str = "x-cf-warnings";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct RootInfo {
    links: RootLinks,
}

#[derive(Debug, Deserialize)]
struct RootLinks {
    login: Option<Link>,
    uaa: Option<Link>,
    cloud_controller_v3: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    #[serde(default)]
    meta: Option<LinkMeta>,
}

#[derive(Debug, Deserialize)]
struct LinkMeta {
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginInfo {
    #[serde(default)]
    prompts: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    pagination: Option<Pagination>,
    #[serde(default)]
    resources: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: Option<Link>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    jti: Option<String>,
}

pub struct HttpPlatform {
    agent: Agent,
    api: String,
    authorization_endpoint: String,
    api_version: Option<String>,
    client_id: String,
    client_secret: String,
    session: Option<UserSession>,
}

impl HttpPlatform {
    /// Reads the endpoint's root document to find the identity service.
    pub fn connect(
        api: &str,
        skip_ssl_validation: bool,
        identity: &IdentitySettings,
    ) -> anyhow::Result<Self> {
        let agent = build_agent(skip_ssl_validation);
        debug!(api, skip_ssl_validation, "reading api root");
        let mut response = agent
            .get(api)
            .call()
            .with_context(|| format!("request api root {api}"))?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(anyhow!("api root {api} returned status {status}"));
        }
        let root: RootInfo = response
            .body_mut()
            .read_json()
            .with_context(|| format!("decode api root {api}"))?;
        let authorization_endpoint = root
            .links
            .login
            .or(root.links.uaa)
            .map(|link| link.href)
            .or_else(|| identity.authorization_endpoint.clone())
            .ok_or_else(|| anyhow!("api root {api} does not advertise a login endpoint"))?;
        let api_version = root
            .links
            .cloud_controller_v3
            .and_then(|link| link.meta)
            .and_then(|meta| meta.version);
        Ok(Self {
            agent,
            api: api.trim_end_matches('/').to_string(),
            authorization_endpoint: authorization_endpoint.trim_end_matches('/').to_string(),
            api_version,
            client_id: identity.client_id.clone(),
            client_secret: identity.client_secret.clone(),
            session: None,
        })
    }

    /// Client for an endpoint already recorded in the settings, without any
    /// network round trip.
    pub fn from_settings(
        api: &str,
        skip_ssl_validation: bool,
        identity: &IdentitySettings,
        session: Option<UserSession>,
    ) -> anyhow::Result<Self> {
        let authorization_endpoint = identity
            .authorization_endpoint
            .clone()
            .ok_or_else(|| anyhow!("no login endpoint recorded for {api}"))?;
        Ok(Self {
            agent: build_agent(skip_ssl_validation),
            api: api.trim_end_matches('/').to_string(),
            authorization_endpoint,
            api_version: None,
            client_id: identity.client_id.clone(),
            client_secret: identity.client_secret.clone(),
            session,
        })
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    pub fn authorization_endpoint(&self) -> &str {
        &self.authorization_endpoint
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.session
            .as_ref()
            .map(|session| format!("bearer {}", session.access_token))
            .ok_or_else(|| ApiError::Request("Not logged in.".to_string()))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        warnings: &mut Warnings,
    ) -> Result<T, ApiError> {
        let mut request = self.agent.get(url).header("Authorization", &self.bearer()?);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let mut response = request
            .call()
            .map_err(|err| ApiError::Request(format!("GET {url} failed: {err}")))?;
        warnings.extend(split_warnings(response.headers()));
        let status = response.status().as_u16();
        debug!(url, status, "api response");
        if !(200..300).contains(&status) {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(ApiError::Request(api_error_message(status, &body)));
        }
        response
            .body_mut()
            .read_json()
            .map_err(|err| ApiError::Request(format!("decode response from {url}: {err}")))
    }

    fn list_all(&self, path: &str, query: &[(&str, &str)]) -> Reply<Vec<Candidate>, ApiError> {
        let mut warnings = Warnings::new();
        let mut candidates = Vec::new();
        let mut url = format!("{}{path}", self.api);
        let mut query = query.to_vec();
        query.push(("per_page", PAGE_SIZE));
        loop {
            let page: Page = match self.get_json(&url, &query, &mut warnings) {
                Ok(page) => page,
                Err(err) => return Reply::err(err).with_warnings(warnings),
            };
            candidates.extend(page.resources);
            match page.pagination.and_then(|pagination| pagination.next) {
                Some(next) => {
                    url = next.href;
                    query.clear();
                }
                None => break,
            }
        }
        Reply::ok(candidates).with_warnings(warnings)
    }

    fn find_one(
        &self,
        path: &str,
        query: &[(&str, &str)],
        not_found: ApiError,
    ) -> Reply<Candidate, ApiError> {
        let reply = self.list_all(path, query);
        let result = reply
            .result
            .and_then(|found| found.into_iter().next().ok_or(not_found));
        Reply {
            warnings: reply.warnings,
            result,
        }
    }
}

impl IdentityService for HttpPlatform {
    fn fetch_prompts(&self, grant_type: GrantType, origin: Option<&str>) -> PromptSet {
        let url = format!("{}/login", self.authorization_endpoint);
        debug!(url = %url, grant_type = grant_type.as_str(), origin, "fetching login prompts");
        let info = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|err| anyhow!("GET {url} failed: {err}"))
            .and_then(|mut response| {
                response
                    .body_mut()
                    .read_json::<LoginInfo>()
                    .map_err(|err| anyhow!("decode {url}: {err}"))
            });
        match info {
            Ok(info) => prompts_from_login_info(info),
            Err(err) => {
                warn!(%err, "login prompts unavailable, using username and password");
                default_prompts()
            }
        }
    }

    fn authenticate(
        &mut self,
        credentials: &Credentials,
        origin: Option<&str>,
        grant_type: GrantType,
    ) -> Reply<(), AuthError> {
        let url = format!("{}/oauth/token", self.authorization_endpoint);
        let mut form = vec![("grant_type".to_string(), "password".to_string())];
        form.extend(
            credentials
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        if let Some(origin) = origin.filter(|_| grant_type == GrantType::Password) {
            form.push((
                "login_hint".to_string(),
                serde_json::json!({ "origin": origin }).to_string(),
            ));
        }
        let basic = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        debug!(url = %url, keys = ?credentials.keys().collect::<Vec<_>>(), "requesting token");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Basic {basic}"))
            .header("Accept", "application/json")
            .send_form(form);
        let mut response = match response {
            Ok(response) => response,
            Err(err) => return Reply::err(AuthError::Other(format!("POST {url} failed: {err}"))),
        };
        let warnings = split_warnings(response.headers());
        let status = response.status().as_u16();
        debug!(status, "token response");
        if (200..300).contains(&status) {
            let result = response
                .body_mut()
                .read_json::<TokenResponse>()
                .map_err(|err| AuthError::Other(format!("decode token response: {err}")))
                .map(|tokens| {
                    self.session = Some(session_from_tokens(tokens));
                });
            return Reply {
                warnings,
                result,
            };
        }
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Reply::err(classify_token_error(status, &body)).with_warnings(warnings)
    }

    fn revoke(&mut self) -> Result<(), AuthError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let claims = decode_claims(&session.access_token);
        let Some(jti) = claims.jti else {
            return Ok(());
        };
        let url = format!("{}/oauth/token/revoke/{jti}", self.authorization_endpoint);
        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &format!("bearer {}", session.access_token))
            .call()
            .map_err(|err| AuthError::Other(format!("DELETE {url} failed: {err}")))?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(AuthError::Other(format!("token revocation returned status {status}")))
        }
    }
}

impl ResourceDirectory for HttpPlatform {
    fn list_organizations(&self) -> Reply<Vec<Candidate>, ApiError> {
        self.list_all("/v3/organizations", &[("order_by", "name")])
    }

    fn list_spaces(&self, org_guid: &str) -> Reply<Vec<Candidate>, ApiError> {
        self.list_all(
            "/v3/spaces",
            &[("organization_guids", org_guid), ("order_by", "name")],
        )
    }

    fn organization_by_name(&self, name: &str) -> Reply<Candidate, ApiError> {
        self.find_one(
            "/v3/organizations",
            &[("names", name)],
            ApiError::OrganizationNotFound(name.to_string()),
        )
    }

    fn space_by_name_and_org(&self, name: &str, org_guid: &str) -> Reply<Candidate, ApiError> {
        self.find_one(
            "/v3/spaces",
            &[("names", name), ("organization_guids", org_guid)],
            ApiError::SpaceNotFound(name.to_string()),
        )
    }
}

impl SessionSource for HttpPlatform {
    fn session(&self) -> Option<UserSession> {
        self.session.clone()
    }
}

fn build_agent(skip_ssl_validation: bool) -> Agent {
    let mut config = Agent::config_builder().http_status_as_error(false);
    if skip_ssl_validation {
        config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
    }
    config.build().into()
}

fn default_prompts() -> PromptSet {
    [
        Prompt::new("username", "Username", PromptKind::Text),
        Prompt::new("password", "Password", PromptKind::Secret),
    ]
    .into_iter()
    .map(|prompt| (prompt.key.clone(), prompt))
    .collect()
}

fn prompts_from_login_info(info: LoginInfo) -> PromptSet {
    info.prompts
        .into_iter()
        .filter_map(|(key, fields)| {
            let [kind, display_name] = fields.as_slice() else {
                return None;
            };
            let kind = if kind == "password" {
                PromptKind::Secret
            } else {
                PromptKind::Text
            };
            Some((key.clone(), Prompt::new(key, display_name.clone(), kind)))
        })
        .collect()
}

fn classify_token_error(status: u16, body: &str) -> AuthError {
    let parsed = serde_json::from_str::<TokenErrorResponse>(body).ok();
    let description = parsed
        .as_ref()
        .map(|err| err.error_description.clone())
        .filter(|description| !description.is_empty());
    match status {
        401 => {
            let description = description.unwrap_or_else(|| "Bad credentials".to_string());
            if description.to_ascii_lowercase().contains("locked") {
                AuthError::AccountLocked(description)
            } else {
                AuthError::Unauthorized(description)
            }
        }
        _ => {
            let detail = description
                .or_else(|| parsed.map(|err| err.error).filter(|error| !error.is_empty()))
                .unwrap_or_else(|| body.trim().to_string());
            AuthError::Other(format!("Error {status}: {detail}"))
        }
    }
}

fn api_error_message(status: u16, body: &str) -> String {
    let details = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("errors").and_then(Value::as_array).cloned())
        .map(|errors| {
            errors
                .iter()
                .filter_map(|error| error.get("detail").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|details| !details.is_empty());
    details.unwrap_or_else(|| format!("Unexpected Response\nResponse code: {status}"))
}

fn split_warnings(headers: &HeaderMap) -> Warnings {
    headers
        .get_all(WARNINGS_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|warning| !warning.is_empty())
        .map(str::to_string)
        .collect()
}

fn decode_claims(access_token: &str) -> TokenClaims {
    access_token
        .split('.')
        .nth(1)
        .and_then(|payload| URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn session_from_tokens(tokens: TokenResponse) -> UserSession {
    let claims = decode_claims(&tokens.access_token);
    UserSession {
        name: claims.user_name.or(claims.client_id).unwrap_or_default(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }
}

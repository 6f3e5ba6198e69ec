use std::collections::BTreeMap;
use std::{fmt, io};

use tracing::debug;

use crate::login::prompt_plan::{PASSCODE_KEY, PASSWORD_KEY, PromptPlan, USERNAME_KEY};
use crate::platform::PromptKind;
use crate::ui::Ui;

/// A collected credential. Never printed: `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialValue {
    inner: String,
}

impl CredentialValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Answers keyed by prompt key. A key, once set, keeps its first value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    values: BTreeMap<String, CredentialValue>,
}

impl Credentials {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(CredentialValue::expose)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.expose()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values
            .entry(key.to_string())
            .or_insert_with(|| CredentialValue::new(value));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut credentials = Credentials::default();
        for (key, value) in iter {
            credentials.insert(&key.into(), value.into());
        }
        credentials
    }
}

/// Values supplied on the command line. Only consulted on the first attempt.
#[derive(Clone, Debug, Default)]
pub struct CredentialOverrides {
    pub username: Option<String>,
    pub password: Option<CredentialValue>,
    pub passcode: Option<CredentialValue>,
}

impl CredentialOverrides {
    fn value_for(&self, key: &str) -> Option<&str> {
        match key {
            USERNAME_KEY => self.username.as_deref(),
            PASSWORD_KEY => self.password.as_ref().map(CredentialValue::expose),
            PASSCODE_KEY => self.passcode.as_ref().map(CredentialValue::expose),
            _ => None,
        }
    }
}

pub struct CredentialCollector<'a> {
    plan: &'a PromptPlan,
    overrides: &'a CredentialOverrides,
}

impl<'a> CredentialCollector<'a> {
    pub fn new(plan: &'a PromptPlan, overrides: &'a CredentialOverrides) -> Self {
        Self { plan, overrides }
    }

    /// Fills one set of credentials. `attempt` is 1-based; overrides are only
    /// honored on attempt 1. A failed read aborts without asking the
    /// remaining prompts.
    pub fn collect(&self, ui: &mut Ui, attempt: u32) -> io::Result<Credentials> {
        let mut credentials = Credentials::default();
        for prompt in self.plan.prompts() {
            if attempt == 1
                && let Some(value) = self.overrides.value_for(&prompt.key)
            {
                debug!(key = %prompt.key, "using credential supplied on the command line");
                credentials.insert(&prompt.key, value.to_string());
                continue;
            }

            ui.display_newline();
            let label = format!("{}: ", prompt.display_name);
            let value = match prompt.kind {
                PromptKind::Text => ui.display_text_prompt(&label),
                PromptKind::Secret => ui.display_password_prompt(&label),
            }
            .inspect_err(|err| debug!(key = %prompt.key, %err, "credential prompt failed"))?;
            credentials.insert(&prompt.key, value);
        }
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Prompt, PromptSet};

    fn plan(prompts: &[(&str, &str, PromptKind)], sso: bool) -> PromptPlan {
        let set: PromptSet = prompts
            .iter()
            .map(|(key, name, kind)| (key.to_string(), Prompt::new(*key, *name, *kind)))
            .collect();
        PromptPlan::build(&set, sso)
    }

    fn user_pass() -> PromptPlan {
        plan(
            &[
                ("username", "Username", PromptKind::Text),
                ("password", "Your Password", PromptKind::Secret),
            ],
            false,
        )
    }

    #[test]
    fn values_are_redacted() {
        let value = CredentialValue::new("super-secret");
        assert_eq!(format!("{value}"), "[REDACTED]");
        assert_eq!(format!("{value:?}"), "[REDACTED]");
        let credentials: Credentials = [("password", "super-secret")].into_iter().collect();
        assert!(!format!("{credentials:?}").contains("super-secret"));
    }

    #[test]
    fn first_value_for_a_key_wins() {
        let credentials: Credentials = [("username", "first"), ("username", "second")]
            .into_iter()
            .collect();
        assert_eq!(credentials.get("username"), Some("first"));
        assert_eq!(credentials.len(), 1);
    }

    #[test]
    fn prompts_in_plan_order() {
        let plan = user_pass();
        let overrides = CredentialOverrides::default();
        let mut ui = Ui::buffered("faker\nsomepassword\n");
        let credentials = CredentialCollector::new(&plan, &overrides)
            .collect(&mut ui, 1)
            .unwrap();
        assert_eq!(credentials.get("username"), Some("faker"));
        assert_eq!(credentials.get("password"), Some("somepassword"));
        let out = ui.out_text();
        let user_at = out.find("Username: ").unwrap();
        let pass_at = out.find("Your Password: ").unwrap();
        assert!(user_at < pass_at);
        assert!(!out.contains("somepassword"));
    }

    #[test]
    fn overrides_skip_prompts_on_first_attempt_only() {
        let plan = user_pass();
        let overrides = CredentialOverrides {
            username: Some("flag-user".to_string()),
            password: Some(CredentialValue::new("flag-pass")),
            passcode: None,
        };
        let collector = CredentialCollector::new(&plan, &overrides);

        let mut ui = Ui::buffered("");
        let first = collector.collect(&mut ui, 1).unwrap();
        assert_eq!(first.get("password"), Some("flag-pass"));
        assert!(!ui.out_text().contains("Username:"));

        let mut ui = Ui::buffered("typed-user\ntyped-pass\n");
        let second = collector.collect(&mut ui, 2).unwrap();
        assert_eq!(second.get("username"), Some("typed-user"));
        assert_eq!(second.get("password"), Some("typed-pass"));
    }

    #[test]
    fn override_for_a_key_outside_the_plan_is_ignored() {
        let plan = plan(&[("passcode", "Passcode", PromptKind::Secret)], true);
        let overrides = CredentialOverrides {
            username: Some("flag-user".to_string()),
            ..CredentialOverrides::default()
        };
        let mut ui = Ui::buffered("abc123\n");
        let credentials = CredentialCollector::new(&plan, &overrides)
            .collect(&mut ui, 1)
            .unwrap();
        assert_eq!(credentials.keys().collect::<Vec<_>>(), vec!["passcode"]);
    }

    #[test]
    fn read_failure_stops_collection() {
        let plan = user_pass();
        let overrides = CredentialOverrides::default();
        let mut ui = Ui::buffered("");
        let err = CredentialCollector::new(&plan, &overrides)
            .collect(&mut ui, 1)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(ui.out_text().contains("Username: "));
        assert!(!ui.out_text().contains("Your Password: "));
    }
}

//! Deterministic ordering of the identity service's prompt set.
//!
//! Text prompts come first, led by `username`; secret prompts follow, led by
//! `password`. Everything else is ordered by key. In SSO mode only the
//! `passcode` prompt survives, outside SSO mode it is dropped.

use crate::platform::{Prompt, PromptKind, PromptSet};

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const PASSCODE_KEY: &str = "passcode";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptPlan {
    prompts: Vec<Prompt>,
}

impl PromptPlan {
    pub fn build(prompts: &PromptSet, sso_mode: bool) -> Self {
        let mut kept = prompts
            .values()
            .filter(|prompt| (prompt.key == PASSCODE_KEY) == sso_mode)
            .cloned()
            .collect::<Vec<_>>();
        kept.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        Self { prompts: kept }
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.prompts.iter().map(|prompt| prompt.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

fn sort_key(prompt: &Prompt) -> (u8, bool, &str) {
    let (kind_rank, lead_key) = match prompt.kind {
        PromptKind::Text => (0, USERNAME_KEY),
        PromptKind::Secret => (1, PASSWORD_KEY),
    };
    (kind_rank, prompt.key != lead_key, prompt.key.as_str())
}

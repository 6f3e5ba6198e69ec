use anyhow::{Context, Result};

use crate::i18n;
use crate::ui::Ui;

/// Canonical form of a user-supplied API endpoint: surrounding whitespace and
/// trailing slashes removed, `https://` added when no scheme is given.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Endpoint from the flag, else the configured one, else asked for until a
/// non-empty answer arrives.
pub fn resolve(ui: &mut Ui, flag: Option<&str>, configured: Option<&str>) -> Result<String> {
    if let Some(value) = flag.filter(|value| !value.trim().is_empty()) {
        return Ok(normalize(value));
    }
    if let Some(value) = configured.filter(|value| !value.trim().is_empty()) {
        return Ok(normalize(value));
    }
    loop {
        let answer = ui
            .display_text_prompt(&i18n::tr("endpoint.prompt", "API endpoint: "))
            .context("read API endpoint")?;
        if !answer.trim().is_empty() {
            return Ok(normalize(&answer));
        }
    }
}

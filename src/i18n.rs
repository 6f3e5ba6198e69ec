//! Translated CLI strings.
//!
//! Catalogs are the JSON files under `i18n/cli/`, embedded at build time and
//! parsed once. A lookup walks `locale`, then its base language, then `en`,
//! and finally returns the caller's inline fallback text.

use std::collections::BTreeMap;
use std::sync::RwLock;

use include_dir::{Dir, include_dir};
use once_cell::sync::Lazy;
use tracing::warn;
use unic_langid::LanguageIdentifier;

pub type Map = BTreeMap<String, String>;

const DEFAULT_LOCALE: &str = "en";

static CLI_I18N: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/i18n/cli");
static CATALOGS: Lazy<BTreeMap<String, Map>> = Lazy::new(parse_catalogs);
static CURRENT_LOCALE: Lazy<RwLock<String>> = Lazy::new(|| RwLock::new(select_locale(None)));

/// Picks the first supported locale out of the `--locale` flag, the POSIX
/// locale variables and the OS setting.
pub fn select_locale(cli_locale: Option<&str>) -> String {
    let from_env = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok());
    cli_locale
        .map(str::to_string)
        .into_iter()
        .chain(from_env)
        .chain(sys_locale::get_locale())
        .find_map(|raw| resolve_supported(&raw))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

pub fn set_locale(locale: impl Into<String>) {
    let locale = locale.into();
    let normalized = normalize_locale_tag(&locale).unwrap_or(locale);
    if let Ok(mut guard) = CURRENT_LOCALE.write() {
        *guard = normalized;
    }
}

pub fn current_locale() -> String {
    CURRENT_LOCALE
        .read()
        .map(|value| value.clone())
        .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
}

pub fn tr(key: &str, fallback: &str) -> String {
    tr_for_locale(key, fallback, &current_locale())
}

/// Like [`tr`], substituting each `{}` in order with `args`.
pub fn trf(key: &str, fallback: &str, args: &[&str]) -> String {
    args.iter()
        .fold(tr(key, fallback), |text, value| text.replacen("{}", value, 1))
}

pub fn tr_for_locale(key: &str, fallback: &str, locale: &str) -> String {
    lookup_chain(locale)
        .iter()
        .filter_map(|name| CATALOGS.get(name))
        .find_map(|catalog| catalog.get(key))
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

fn parse_catalogs() -> BTreeMap<String, Map> {
    CLI_I18N
        .files()
        .filter_map(|file| {
            let name = file.path().file_stem()?.to_str()?.to_string();
            let parsed = file
                .contents_utf8()
                .ok_or_else(|| "not valid UTF-8".to_string())
                .and_then(|raw| serde_json::from_str::<Map>(raw).map_err(|err| err.to_string()));
            match parsed {
                Ok(map) => Some((name, map)),
                Err(err) => {
                    warn!(catalog = %name, %err, "skipping embedded i18n catalog");
                    None
                }
            }
        })
        .collect()
}

fn lookup_chain(locale: &str) -> Vec<String> {
    let mut chain = Vec::with_capacity(3);
    if let Some(tag) = normalize_locale_tag(locale) {
        if let Some(base) = base_language(&tag)
            && base != tag
        {
            chain.push(tag);
            chain.push(base);
        } else {
            chain.push(tag);
        }
    }
    if !chain.iter().any(|name| name == DEFAULT_LOCALE) {
        chain.push(DEFAULT_LOCALE.to_string());
    }
    chain
}

/// `en_US.UTF-8` style system values to BCP 47 tags; `C` and `POSIX` carry
/// no language.
fn normalize_locale_tag(raw: &str) -> Option<String> {
    let cleaned = raw.trim().split(['.', '@']).next().unwrap_or_default();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("c") || cleaned.eq_ignore_ascii_case("posix") {
        return None;
    }
    cleaned
        .replace('_', "-")
        .parse::<LanguageIdentifier>()
        .ok()
        .map(|tag| tag.to_string())
}

fn base_language(tag: &str) -> Option<String> {
    tag.parse::<LanguageIdentifier>()
        .ok()
        .map(|tag| tag.language.to_string())
}

fn resolve_supported(candidate: &str) -> Option<String> {
    let tag = normalize_locale_tag(candidate)?;
    if CATALOGS.contains_key(&tag) {
        return Some(tag);
    }
    base_language(&tag).filter(|base| CATALOGS.contains_key(base))
}

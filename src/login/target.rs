//! Interactive selection of an org or a space out of a candidate list.
//!
//! | candidates | behavior                                          |
//! |------------|---------------------------------------------------|
//! | 0          | skipped, nothing printed                          |
//! | 1          | selected without asking                           |
//! | 2..=50     | numbered menu; position first, then exact name    |
//! | > 50       | name only                                         |

use std::fmt;

use tracing::debug;

use crate::i18n;
use crate::platform::Candidate;
use crate::ui::Ui;

pub const MAX_MENU_CANDIDATES: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Org,
    Space,
}

impl TargetKind {
    /// Lowercase noun used inside sentences.
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::Org => "org",
            TargetKind::Space => "space",
        }
    }

    fn select_heading(self) -> String {
        match self {
            TargetKind::Org => i18n::tr("target.select_org", "Select an org:"),
            TargetKind::Space => i18n::tr("target.select_space", "Select a space:"),
        }
    }

    fn prompt_label(self) -> String {
        match self {
            TargetKind::Org => i18n::tr("target.prompt_org", "Org (enter to skip): "),
            TargetKind::Space => i18n::tr("target.prompt_space", "Space (enter to skip): "),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Selected(Candidate),
    Skipped,
    NotFound(String),
}

impl Resolution {
    pub fn selected(&self) -> Option<&Candidate> {
        match self {
            Resolution::Selected(candidate) => Some(candidate),
            Resolution::Skipped | Resolution::NotFound(_) => None,
        }
    }
}

/// How one line of menu input was understood.
#[derive(Debug, PartialEq, Eq)]
enum MenuChoice {
    Skip,
    Position(usize),
    InvalidPosition,
    Name(String),
}

/// Blank input skips. While positions are allowed, anything shaped like an
/// integer is a position, in range or not; everything else is matched
/// verbatim against the names.
fn interpret(input: &str, candidate_count: usize, positions_allowed: bool) -> MenuChoice {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return MenuChoice::Skip;
    }
    if positions_allowed && is_integer(trimmed) {
        return match trimmed.strip_prefix('+').unwrap_or(trimmed).parse::<usize>() {
            Ok(position) if (1..=candidate_count).contains(&position) => {
                MenuChoice::Position(position - 1)
            }
            _ => MenuChoice::InvalidPosition,
        };
    }
    MenuChoice::Name(input.to_string())
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

pub struct TargetResolver<'a> {
    kind: TargetKind,
    parent: Option<&'a Candidate>,
}

impl<'a> TargetResolver<'a> {
    pub fn organizations() -> Self {
        Self {
            kind: TargetKind::Org,
            parent: None,
        }
    }

    pub fn spaces(org: &'a Candidate) -> Self {
        Self {
            kind: TargetKind::Space,
            parent: Some(org),
        }
    }

    pub fn resolve(&self, ui: &mut Ui, candidates: &[Candidate]) -> Resolution {
        debug!(
            kind = %self.kind,
            parent = self.parent.map(|org| org.guid.as_str()),
            candidates = candidates.len(),
            "resolving target"
        );
        let resolution = match candidates {
            [] => Resolution::Skipped,
            [only] => Resolution::Selected(only.clone()),
            _ if candidates.len() > MAX_MENU_CANDIDATES => self.by_name(ui, candidates),
            _ => self.by_menu(ui, candidates),
        };
        if let Resolution::Selected(candidate) = &resolution {
            ui.display_text(&i18n::trf(
                "target.targeted",
                "Targeted {} {}",
                &[self.kind.label(), candidate.name.as_str()],
            ));
            ui.display_newline();
        }
        resolution
    }

    fn by_menu(&self, ui: &mut Ui, candidates: &[Candidate]) -> Resolution {
        loop {
            ui.display_text(&self.kind.select_heading());
            for (index, candidate) in candidates.iter().enumerate() {
                ui.display_text(&format!("{}. {}", index + 1, candidate.name));
            }
            ui.display_newline();

            let Ok(input) = ui.display_text_prompt(&self.kind.prompt_label()) else {
                return Resolution::Skipped;
            };
            match interpret(&input, candidates.len(), true) {
                MenuChoice::Skip => return Resolution::Skipped,
                MenuChoice::Position(index) => {
                    return Resolution::Selected(candidates[index].clone());
                }
                MenuChoice::InvalidPosition => {
                    debug!(kind = %self.kind, "menu position out of range, asking again");
                    ui.display_newline();
                }
                MenuChoice::Name(name) => return find_by_name(candidates, name),
            }
        }
    }

    fn by_name(&self, ui: &mut Ui, candidates: &[Candidate]) -> Resolution {
        ui.display_text(&i18n::tr(
            "target.too_many_options",
            "There are too many options to display; please type in the name.",
        ));
        ui.display_newline();
        let Ok(input) = ui.display_text_prompt(&self.kind.prompt_label()) else {
            return Resolution::Skipped;
        };
        match interpret(&input, candidates.len(), false) {
            MenuChoice::Name(name) => find_by_name(candidates, name),
            _ => Resolution::Skipped,
        }
    }
}

fn find_by_name(candidates: &[Candidate], name: String) -> Resolution {
    match candidates.iter().find(|candidate| candidate.name == name) {
        Some(candidate) => Resolution::Selected(candidate.clone()),
        None => Resolution::NotFound(name),
    }
}

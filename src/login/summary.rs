use crate::i18n;
use crate::settings::CliSettings;
use crate::ui::Ui;

/// Prints the target block shown at the end of `login`, whether or not the
/// login succeeded.
pub fn display_status(ui: &mut Ui, settings: &CliSettings, binary_name: &str) {
    let endpoint = settings.target.clone().unwrap_or_default();
    let endpoint = match settings.api_version.as_deref() {
        Some(version) => i18n::trf(
            "summary.endpoint_with_version",
            "{} (API version: {})",
            &[endpoint.as_str(), version],
        ),
        None => endpoint,
    };
    let mut rows = vec![(
        i18n::tr("summary.api_endpoint", "API endpoint:"),
        endpoint,
    )];

    let Some(user) = settings.user_name() else {
        ui.display_newline();
        ui.display_key_value_table(&rows);
        ui.display_text(&i18n::trf(
            "summary.not_logged_in",
            "Not logged in. Use '{} login' or '{} login --sso' to log in.",
            &[binary_name, binary_name],
        ));
        return;
    };
    rows.push((i18n::tr("summary.user", "User:"), user.to_string()));

    let Some(org) = settings.organization.as_ref() else {
        ui.display_newline();
        ui.display_key_value_table(&rows);
        ui.display_text(&i18n::trf(
            "summary.no_org_or_space",
            "No org or space targeted, use '{} target -o ORG -s SPACE'",
            &[binary_name],
        ));
        return;
    };
    rows.push((i18n::tr("summary.org", "Org:"), org.name.clone()));

    let space = match settings.space.as_ref() {
        Some(space) => space.name.clone(),
        None => i18n::trf(
            "summary.no_space",
            "No space targeted, use '{} target -s SPACE'",
            &[binary_name],
        ),
    };
    rows.push((i18n::tr("summary.space", "Space:"), space));

    ui.display_newline();
    ui.display_key_value_table(&rows);
}

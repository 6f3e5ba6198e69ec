use tracing::warn;

use crate::i18n;
use crate::platform::IdentityService;
use crate::settings::CliSettings;
use crate::ui::Ui;

/// Revokes the current tokens and forgets the user and target. A failed
/// revocation is logged and does not stop the logout.
pub fn logout<I: IdentityService>(ui: &mut Ui, identity: Option<&mut I>, settings: &mut CliSettings) {
    let user = settings.user_name().unwrap_or_default().to_string();
    ui.display_text(&i18n::trf("logout.logging_out", "Logging out {}...", &[user.as_str()]));

    if let Some(identity) = identity
        && let Err(err) = identity.revoke()
    {
        warn!(%err, "token revocation failed");
    }

    settings.unset_user();
    settings.identity.grant_type = Default::default();
    ui.display_ok();
}

#[path = "support/fake_platform.rs"]
mod fake_platform;

use fake_platform::{FakePlatform, unauthorized};
use tenantctl::login::{LoginCommand, LoginRequest};
use tenantctl::platform::{Candidate, GrantType};
use tenantctl::settings::{CliSettings, UserSession};
use tenantctl::ui::Ui;

fn targeted() -> CliSettings {
    CliSettings {
        target: Some("https://api.example.com".to_string()),
        api_version: Some("3.4.5".to_string()),
        ..CliSettings::default()
    }
}

#[test]
fn successful_login_records_user_and_target() {
    let mut platform = FakePlatform::new()
        .with_orgs(&["1234", "alpha", "beta"])
        .with_spaces(&["dev"]);
    let mut settings = targeted();
    let mut ui = Ui::buffered("u\np\n2\n");

    let report = LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap();

    assert!(report.authenticated);
    assert_eq!(settings.user_name(), Some("some-user"));
    assert_eq!(settings.organization.as_ref().map(|o| o.name.as_str()), Some("alpha"));
    assert_eq!(settings.space.as_ref().map(|s| s.name.as_str()), Some("dev"));
    assert_eq!(settings.identity.grant_type, GrantType::Password);

    let out = ui.out_text();
    assert!(out.contains("API endpoint:   https://api.example.com (API version: 3.4.5)\n"));
    assert!(out.contains("User:           some-user\n"));
    assert!(out.contains("Org:            alpha\n"));
    assert!(out.contains("Space:          dev\n"));
}

#[test]
fn org_without_spaces_shows_no_space_hint() {
    let mut platform = FakePlatform::new().with_orgs(&["1234", "alpha", "beta"]);
    let mut settings = targeted();
    let mut ui = Ui::buffered("u\np\n2\n");

    LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap();

    assert!(settings.space.is_none());
    assert!(
        ui.out_text()
            .contains("Space:          No space targeted, use 'tenantctl target -s SPACE'\n")
    );
}

#[test]
fn no_orgs_shows_target_hint() {
    let mut platform = FakePlatform::new();
    let mut settings = targeted();
    let mut ui = Ui::buffered("u\np\n");

    LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap();

    assert!(settings.organization.is_none());
    assert!(
        ui.out_text()
            .contains("No org or space targeted, use 'tenantctl target -o ORG -s SPACE'\n")
    );
}

#[test]
fn failed_login_clears_the_previous_user_and_still_prints_status() {
    let mut platform =
        FakePlatform::new().with_auth_replies([unauthorized(), unauthorized(), unauthorized()]);
    let mut settings = targeted();
    settings.user = Some(UserSession {
        name: "previous-user".to_string(),
        ..UserSession::default()
    });
    settings.organization = Some(Candidate::new("old-org-guid", "old-org"));
    let mut ui = Ui::buffered("u\np\nu\np\nu\np\n");

    let err = LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap_err();

    assert_eq!(err.to_string(), "Unable to authenticate.");
    assert!(settings.user.is_none());
    assert!(settings.organization.is_none());
    assert!(
        ui.out_text()
            .contains("Not logged in. Use 'tenantctl login' or 'tenantctl login --sso' to log in.\n")
    );
}

#[test]
fn service_account_session_is_kept() {
    let mut platform = FakePlatform::new();
    let mut settings = targeted();
    settings.identity.grant_type = GrantType::ClientCredentials;
    settings.user = Some(UserSession {
        name: "service-account".to_string(),
        ..UserSession::default()
    });
    let mut ui = Ui::buffered("");

    let err = LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap_err();

    assert!(err.to_string().starts_with("Service account currently logged in."));
    assert_eq!(settings.user_name(), Some("service-account"));
    assert_eq!(platform.auth_count(), 0);
}

#[test]
fn retargeting_the_same_endpoint_keeps_the_service_account() {
    let mut platform = FakePlatform::new();
    let mut settings = targeted();
    settings.identity.grant_type = GrantType::ClientCredentials;
    settings.user = Some(UserSession {
        name: "service-account".to_string(),
        ..UserSession::default()
    });
    settings.organization = Some(Candidate::new("org-guid", "some-org"));
    settings.set_target("https://api.example.com", Some("3.4.5".to_string()), false);
    let mut ui = Ui::buffered("");

    let err = LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap_err();

    assert!(err.to_string().starts_with("Service account currently logged in."));
    assert_eq!(settings.user_name(), Some("service-account"));
    assert_eq!(settings.organization.as_ref().map(|o| o.name.as_str()), Some("some-org"));
    assert!(ui.out_text().contains("User:           service-account\n"));
}

#[test]
fn custom_client_with_password_grant_prints_deprecation() {
    let mut platform = FakePlatform::new();
    let mut settings = targeted();
    settings.identity.client_id = "custom-client".to_string();
    settings.identity.client_secret = "custom-secret".to_string();
    let mut ui = Ui::buffered("u\np\n");

    LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap();

    assert!(ui.err_text().contains(
        "Deprecation warning: Manually writing your client credentials to the config file is deprecated"
    ));
    assert!(ui.err_text().contains("'tenantctl auth --client-credentials'"));
}

#[test]
fn default_client_prints_no_deprecation() {
    let mut platform = FakePlatform::new();
    let mut settings = targeted();
    let mut ui = Ui::buffered("u\np\n");

    LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(LoginRequest::default())
        .unwrap();

    assert!(!ui.err_text().contains("Deprecation warning"));
}

#[test]
fn sso_login_is_stored_as_password_grant() {
    let mut platform = FakePlatform::new().with_prompts(&[(
        "passcode",
        "Passcode",
        tenantctl::platform::PromptKind::Secret,
    )]);
    let mut settings = targeted();
    let mut ui = Ui::buffered("abc123\n");
    let request = LoginRequest {
        sso: true,
        ..LoginRequest::default()
    };

    LoginCommand::new(&mut ui, &mut platform, &mut settings, "tenantctl")
        .execute(request)
        .unwrap();

    assert_eq!(platform.auth_calls[0].grant_type, GrantType::SsoPasscode);
    assert_eq!(settings.identity.grant_type, GrantType::Password);
}

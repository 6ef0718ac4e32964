//! Login, session teardown, and route guarding against the mock gateway.

use smsadmin_client::auth::AuthClient;
use smsadmin_client::credits::CreditClient;
use smsadmin_core::error::ErrorKind;
use smsadmin_core::types::{PageQuery, Role};
use smsadmin_session::{AccessDecision, check_access};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_opens_session_with_decoded_role() {
    let app = TestApp::new().await;
    let client = AuthClient::new(app.transport.clone());

    let session = client.login("ops@gateway.sn", "secret").await.unwrap();

    assert_eq!(session.email, "ops@gateway.sn");
    assert_eq!(session.role, Role::Admin);
    assert!(app.session.is_authenticated());
    assert!(app.session.token().is_some());
}

#[tokio::test]
async fn test_login_super_admin_role() {
    let app = TestApp::new().await;
    let client = AuthClient::new(app.transport.clone());

    let session = client.login("root@gateway.sn", "secret").await.unwrap();
    assert_eq!(session.role, Role::SuperAdmin);
}

#[tokio::test]
async fn test_bad_credentials_leave_existing_session_intact() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    let client = AuthClient::new(app.transport.clone());

    let err = client
        .login("ops@gateway.sn", "wrongpassword")
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
    // A failed re-login is bad credentials, not a dead session.
    assert!(app.session.is_authenticated());
}

#[tokio::test]
async fn test_revoked_token_tears_session_down() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.force_unauthorized = true;

    let client = CreditClient::new(app.transport.clone());
    let err = client.list(PageQuery::new(0, 10), None).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(app.session.current_session().is_none());
    assert!(app.session.token().is_none());
}

#[tokio::test]
async fn test_guard_redirects_signed_out_to_login() {
    let app = TestApp::new().await;
    assert_eq!(
        check_access(&app.session, None),
        AccessDecision::RedirectLogin
    );
    assert_eq!(
        check_access(&app.session, Some(Role::SuperAdmin)),
        AccessDecision::RedirectLogin
    );
}

#[tokio::test]
async fn test_guard_enforces_role_requirements() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");

    assert_eq!(check_access(&app.session, None), AccessDecision::Granted);
    assert_eq!(
        check_access(&app.session, Some(Role::Admin)),
        AccessDecision::Granted
    );
    assert_eq!(
        check_access(&app.session, Some(Role::SuperAdmin)),
        AccessDecision::RedirectUnauthorized
    );
}

#[tokio::test]
async fn test_guard_super_admin_passes_everything() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");

    assert_eq!(check_access(&app.session, None), AccessDecision::Granted);
    assert_eq!(
        check_access(&app.session, Some(Role::Admin)),
        AccessDecision::Granted
    );
    assert_eq!(
        check_access(&app.session, Some(Role::SuperAdmin)),
        AccessDecision::Granted
    );
}

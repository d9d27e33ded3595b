mod helpers;

use std::sync::Arc;

use cdrive_app::{LoginFlow, Navigation, RegisterFlow, RegisterStage};
use helpers::{session, FakeGateway, ISSUED_TOKEN, VALID_OTP};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn login_stores_token_before_returning() {
    let gateway = Arc::new(FakeGateway::new().with_verified_user("user@example.com", "secret"));
    let session = session();
    let flow = LoginFlow::new(gateway, session.clone());

    let outcome = assert_ok!(flow.submit("user@example.com", "secret").await);
    assert_eq!(outcome.navigate_to, Navigation::Dashboard);
    assert_eq!(outcome.message, "Login successful! Redirecting...");
    assert_eq!(session.token().as_deref(), Some(ISSUED_TOKEN));
    assert!(!flow.is_submitting());
}

#[tokio::test]
async fn rejected_login_leaves_session_empty() {
    let gateway = Arc::new(FakeGateway::new().with_verified_user("user@example.com", "secret"));
    let session = session();
    let flow = LoginFlow::new(gateway, session.clone());

    let err = assert_err!(flow.submit("user@example.com", "wrong").await);
    assert!(err.is_auth());
    assert_eq!(err.to_string(), "invalid credentials");
    assert!(session.token().is_none());
}

#[tokio::test]
async fn malformed_login_form_never_reaches_gateway() {
    let gateway = Arc::new(FakeGateway::new());
    let flow = LoginFlow::new(gateway.clone(), session());

    let err = assert_err!(flow.submit("not-an-email", "secret").await);
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "Invalid email");

    assert_err!(flow.submit("user@example.com", "").await);
    assert_eq!(gateway.login_calls(), 0);
}

#[tokio::test]
async fn register_moves_to_passcode_stage() {
    let gateway = Arc::new(FakeGateway::new());
    let mut flow = RegisterFlow::new(gateway);
    assert_eq!(flow.stage(), RegisterStage::CollectingCredentials);

    let outcome = assert_ok!(flow.submit_credentials("new@example.com", "pw").await);
    assert_eq!(
        outcome.message,
        "Registration successful! Please check your email for the OTP."
    );
    assert_eq!(outcome.navigate_to, Navigation::Stay);
    assert_eq!(flow.stage(), RegisterStage::CollectingPasscode);
    assert_eq!(flow.email(), Some("new@example.com"));
}

#[tokio::test]
async fn duplicate_registration_stays_collecting_credentials() {
    let gateway = Arc::new(FakeGateway::new().with_verified_user("taken@example.com", "pw"));
    let mut flow = RegisterFlow::new(gateway);

    let err = assert_err!(flow.submit_credentials("taken@example.com", "pw").await);
    assert_eq!(err.to_string(), "User already exists");
    assert_eq!(flow.stage(), RegisterStage::CollectingCredentials);
    assert!(flow.email().is_none());
}

#[tokio::test]
async fn passcode_before_registration_is_rejected() {
    let mut flow = RegisterFlow::new(Arc::new(FakeGateway::new()));
    let err = assert_err!(flow.submit_passcode(VALID_OTP).await);
    assert!(err.is_validation());
    assert_eq!(flow.stage(), RegisterStage::CollectingCredentials);
}

#[tokio::test]
async fn resumed_flow_verifies_existing_account() {
    let gateway = Arc::new(FakeGateway::new());
    let mut first = RegisterFlow::new(gateway.clone());
    assert_ok!(first.submit_credentials("later@example.com", "pw").await);

    let mut resumed = RegisterFlow::awaiting_passcode(gateway, "later@example.com");
    assert_eq!(resumed.stage(), RegisterStage::CollectingPasscode);
    let outcome = assert_ok!(resumed.submit_passcode(VALID_OTP).await);
    assert_eq!(outcome.navigate_to, Navigation::Login);
    assert_eq!(resumed.stage(), RegisterStage::Verified);

    let err = assert_err!(resumed.submit_passcode(VALID_OTP).await);
    assert!(err.is_validation());
}

#[tokio::test]
async fn blank_passcode_is_rejected_locally() {
    let gateway = Arc::new(FakeGateway::new());
    let mut flow = RegisterFlow::awaiting_passcode(gateway, "someone@example.com");
    let err = assert_err!(flow.submit_passcode("   ").await);
    assert!(err.is_validation());
    assert_eq!(flow.stage(), RegisterStage::CollectingPasscode);
}

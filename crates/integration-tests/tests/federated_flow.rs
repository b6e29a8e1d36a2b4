//! Federated (Google) login: idempotent first-login profile creation and
//! logout.

use mockito::Matcher;

use arrivo_app::nav::Screen;
use arrivo_integration_tests::TestContext;

#[tokio::test]
async fn first_google_login_creates_profile_and_routes_to_setup() {
    let mut ctx = TestContext::new().await;
    ctx.server
        .mock("POST", "/accounts:signInWithIdp")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "providerId": "google.com",
            "idToken": "google-token"
        })))
        .with_status(200)
        .with_body(TestContext::session_body("uid-g", "g@x.com", "G"))
        .create_async()
        .await;
    let create = ctx
        .server
        .mock("PUT", "/users/uid-g")
        .match_header("if-none-match", "*")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "g@x.com",
            "profileSetupCompleted": false
        })))
        .with_status(201)
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/users/uid-g")
        .with_status(200)
        .with_body(r#"{"email": "g@x.com", "profileSetupCompleted": false}"#)
        .create_async()
        .await;

    ctx.state
        .login_with_google("google-token")
        .await
        .expect("first google login should succeed");

    create.assert_async().await;
    assert_eq!(
        ctx.state.with_navigator(|nav| nav.current()),
        Screen::ProfileSetup
    );
}

#[tokio::test]
async fn second_google_login_tolerates_existing_profile() {
    let mut ctx = TestContext::new().await;
    ctx.server
        .mock("POST", "/accounts:signInWithIdp")
        .with_status(200)
        .with_body(TestContext::session_body("uid-g", "g@x.com", "G"))
        .create_async()
        .await;
    // The conditional create loses: the profile is already there.
    ctx.server
        .mock("PUT", "/users/uid-g")
        .match_header("if-none-match", "*")
        .with_status(409)
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/users/uid-g")
        .with_status(200)
        .with_body(r#"{"email": "g@x.com", "profileSetupCompleted": true}"#)
        .create_async()
        .await;

    let account = ctx
        .state
        .login_with_google("google-token")
        .await
        .expect("repeat google login should succeed");

    assert_eq!(account.uid.as_str(), "uid-g");
    assert_eq!(
        ctx.state.session().snapshot().profile_setup_completed(),
        Some(true)
    );
    assert_eq!(ctx.state.with_navigator(|nav| nav.current()), Screen::Home);
}

#[tokio::test]
async fn logout_revokes_token_and_lands_on_login() {
    let mut ctx = TestContext::new().await;
    ctx.server
        .mock("POST", "/accounts:signInWithIdp")
        .with_status(200)
        .with_body(TestContext::session_body("uid-g", "g@x.com", "G"))
        .create_async()
        .await;
    ctx.server
        .mock("PUT", "/users/uid-g")
        .with_status(201)
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/users/uid-g")
        .with_status(200)
        .with_body(r#"{"profileSetupCompleted": true}"#)
        .create_async()
        .await;
    let revoke = ctx
        .server
        .mock("POST", "/token:revoke")
        .match_body(Matcher::Json(serde_json::json!({"refreshToken": "rft-uid-g"})))
        .with_status(200)
        .create_async()
        .await;

    ctx.state
        .login_with_google("google-token")
        .await
        .expect("google login should succeed");
    ctx.state.logout().await.expect("logout should succeed");

    revoke.assert_async().await;
    let snapshot = ctx.state.session().snapshot();
    assert!(!snapshot.is_authenticated());
    assert_eq!(ctx.state.with_navigator(|nav| nav.current()), Screen::Login);
}

//! Registration and onboarding: account creation, the initial profile
//! document, the setup screen, and the completion write.

use mockito::Matcher;

use arrivo_app::models::UserProfile;
use arrivo_app::nav::Screen;
use arrivo_integration_tests::TestContext;

#[tokio::test]
async fn register_onboard_and_land_home() {
    let mut ctx = TestContext::new().await;

    let signup = ctx
        .server
        .mock("POST", "/accounts:signUp")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "a@x.com",
            "displayName": "A"
        })))
        .with_status(200)
        .with_body(TestContext::session_body("uid-1", "a@x.com", "A"))
        .create_async()
        .await;
    let profile_create = ctx
        .server
        .mock("PUT", "/users/uid-1")
        .match_header("if-none-match", "*")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "a@x.com",
            "displayName": "A",
            "profileSetupCompleted": false
        })))
        .with_status(200)
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/users/uid-1")
        .with_status(200)
        .with_body(r#"{"email": "a@x.com", "displayName": "A", "profileSetupCompleted": false}"#)
        .create_async()
        .await;

    let account = ctx
        .state
        .register("a@x.com", "secret1", "A", None)
        .await
        .expect("registration should succeed");

    signup.assert_async().await;
    profile_create.assert_async().await;
    assert_eq!(account.display_name.as_deref(), Some("A"));

    // Incomplete profile routes into onboarding.
    let snapshot = ctx.state.session().snapshot();
    assert!(snapshot.is_authenticated());
    assert_eq!(snapshot.profile_setup_completed(), Some(false));
    assert_eq!(
        ctx.state.with_navigator(|nav| nav.current()),
        Screen::ProfileSetup
    );

    // Finishing setup merges the document and lands on home.
    let merge = ctx
        .server
        .mock("PATCH", "/users/uid-1")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "country": "AE",
            "city": "Dubai",
            "profileSetupCompleted": true
        })))
        .with_status(200)
        .create_async()
        .await;
    ctx.server
        .mock("GET", "/users/uid-1")
        .with_status(200)
        .with_body(
            r#"{"email": "a@x.com", "country": "AE", "city": "Dubai",
                "profileSetupCompleted": true}"#,
        )
        .create_async()
        .await;

    let profile = UserProfile {
        email: Some("a@x.com".to_string()),
        country: Some("AE".to_string()),
        city: Some("Dubai".to_string()),
        ..UserProfile::default()
    };
    ctx.state
        .complete_profile(profile)
        .await
        .expect("profile completion should succeed");

    merge.assert_async().await;
    assert_eq!(
        ctx.state.session().snapshot().profile_setup_completed(),
        Some(true)
    );
    assert_eq!(ctx.state.with_navigator(|nav| nav.current()), Screen::Home);
}

#[tokio::test]
async fn duplicate_email_surfaces_friendly_message() {
    let mut ctx = TestContext::new().await;
    ctx.server
        .mock("POST", "/accounts:signUp")
        .with_status(400)
        .with_body(r#"{"error": {"message": "EMAIL_EXISTS"}}"#)
        .create_async()
        .await;

    let err = ctx
        .state
        .register("a@x.com", "secret1", "A", None)
        .await
        .expect_err("duplicate email must fail");

    assert_eq!(
        err.user_message(),
        "An account with this email already exists."
    );
    assert!(!ctx.state.session().snapshot().is_authenticated());
}

#[tokio::test]
async fn validation_failures_never_reach_the_network() {
    // No mocks registered: any request would fail the test with a 501.
    let ctx = TestContext::new().await;

    let weak = ctx
        .state
        .register("a@x.com", "short", "A", None)
        .await
        .expect_err("weak password must fail");
    assert_eq!(weak.user_message(), "Password must be at least 6 characters.");

    let malformed = ctx
        .state
        .register("not-an-email", "secret1", "A", None)
        .await
        .expect_err("malformed email must fail");
    assert_eq!(
        malformed.user_message(),
        "Please enter a valid email address."
    );
}

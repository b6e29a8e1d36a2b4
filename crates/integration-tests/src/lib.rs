//! Integration tests for Arrivo.
//!
//! Each test stands up a [`TestContext`]: one mock HTTP server playing all
//! three managed backends (document store, blob store, identity provider)
//! plus an [`AppState`] pointed at it. Tests drive the real flows -
//! registration, login, onboarding, shopping, checkout - and assert both
//! the requests that reach the backend and the state the screens would
//! observe.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p arrivo-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use mockito::{Server, ServerGuard};

use arrivo_app::{AppConfig, AppState};

/// One mock backend plus an application state wired against it.
pub struct TestContext {
    /// Mock server playing document store, blob store, and identity.
    pub server: ServerGuard,
    /// Application state under test.
    pub state: AppState,
}

impl TestContext {
    /// Stand up a fresh mock backend and app state.
    ///
    /// # Panics
    ///
    /// Panics when the mock server URL is rejected, which cannot happen.
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let config = AppConfig::for_endpoint(&server.url(), "integration-test-key")
            .expect("mock server URL must parse");
        let state = AppState::new(config);
        Self { server, state }
    }

    /// Identity-provider session body for `uid`.
    #[must_use]
    pub fn session_body(uid: &str, email: &str, display_name: &str) -> String {
        serde_json::json!({
            "uid": uid,
            "email": email,
            "displayName": display_name,
            "idToken": format!("idt-{uid}"),
            "refreshToken": format!("rft-{uid}"),
        })
        .to_string()
    }
}

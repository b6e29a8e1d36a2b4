//! Application state shared across screens.
//!
//! The single composition root: built once at app start, cloned into every
//! screen, torn down never. Replaces the module-level context providers of
//! the original design so tests can stand up an isolated state per case.

use std::sync::{Arc, Mutex, PoisonError};

use arrivo_core::OrderId;

use crate::cart::Cart;
use crate::checkout;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Account, UserProfile};
use crate::nav::{Navigator, Screen};
use crate::services::blobstore::BlobStoreClient;
use crate::services::docstore::DocStoreClient;
use crate::services::identity::IdentityClient;
use crate::services::session::SessionObserver;

/// Application state shared across all screens.
///
/// Cheaply cloneable via `Arc`. Service clients are immutable; the
/// navigator and cart sit behind mutexes because screens mutate them from
/// UI events.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    docstore: DocStoreClient,
    blobstore: BlobStoreClient,
    identity: IdentityClient,
    session: SessionObserver,
    navigator: Mutex<Navigator>,
    cart: Mutex<Cart>,
}

impl AppState {
    /// Wire up all clients from configuration.
    ///
    /// The app starts on the login screen; [`Self::login`] and
    /// [`Self::register`] reroute based on profile completeness.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let docstore = DocStoreClient::new(&config.docstore);
        let blobstore = BlobStoreClient::new(&config.blobstore);
        let identity = IdentityClient::new(&config.identity, docstore.clone());
        let session = SessionObserver::new(docstore.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                docstore,
                blobstore,
                identity,
                session,
                navigator: Mutex::new(Navigator::new(Screen::Login)),
                cart: Mutex::new(Cart::new()),
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the document database client.
    #[must_use]
    pub fn docstore(&self) -> &DocStoreClient {
        &self.inner.docstore
    }

    /// Get a reference to the object store client.
    #[must_use]
    pub fn blobstore(&self) -> &BlobStoreClient {
        &self.inner.blobstore
    }

    /// Get a reference to the identity client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the session observer.
    #[must_use]
    pub fn session(&self) -> &SessionObserver {
        &self.inner.session
    }

    /// Run `f` with the navigator locked.
    pub fn with_navigator<R>(&self, f: impl FnOnce(&mut Navigator) -> R) -> R {
        let mut navigator = self
            .inner
            .navigator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut navigator)
    }

    /// Run `f` with the cart locked.
    pub fn with_cart<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    // =========================================================================
    // Cross-service flows
    // =========================================================================

    /// Login with email and password, then route by profile completeness.
    ///
    /// # Errors
    ///
    /// Returns the translated identity error; the session and navigation
    /// stay untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let account = self.inner.identity.login(email, password).await?;
        self.inner.session.auth_changed(Some(account.clone())).await;
        self.reroute_for_session();
        Ok(account)
    }

    /// Register a new account, then route into onboarding.
    ///
    /// # Errors
    ///
    /// Returns the translated identity error (including the rolled-back
    /// profile-write case).
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        phone: Option<&str>,
    ) -> Result<Account, AppError> {
        let account = self
            .inner
            .identity
            .register(email, password, display_name, phone)
            .await?;
        self.inner.session.auth_changed(Some(account.clone())).await;
        self.reroute_for_session();
        Ok(account)
    }

    /// Federated Google login, then route by profile completeness.
    ///
    /// # Errors
    ///
    /// Returns the translated identity error.
    pub async fn login_with_google(&self, id_token: &str) -> Result<Account, AppError> {
        let account = self.inner.identity.login_with_google(id_token).await?;
        self.inner.session.auth_changed(Some(account.clone())).await;
        self.reroute_for_session();
        Ok(account)
    }

    /// Logout: revoke the session, clear the cart, land on login.
    ///
    /// # Errors
    ///
    /// Returns the identity error when token revocation fails; local state
    /// is cleared regardless, so a dead backend cannot trap a user in a
    /// session.
    pub async fn logout(&self) -> Result<(), AppError> {
        let revoke_result = match self.inner.session.snapshot().user().cloned() {
            Some(account) => self.inner.identity.logout(&account).await,
            None => Ok(()),
        };

        self.inner.session.auth_changed(None).await;
        self.with_cart(Cart::clear);
        self.with_navigator(|nav| nav.reset(Screen::Login));

        revoke_result.map_err(AppError::from)
    }

    /// Finish onboarding: merge the profile with the completed flag set,
    /// reload the session's view of it, and route home.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` when no user is signed in, or
    /// the document store failure from the merge write.
    pub async fn complete_profile(&self, mut profile: UserProfile) -> Result<(), AppError> {
        let Some(account) = self.inner.session.snapshot().user().cloned() else {
            return Err(AppError::NotAuthenticated);
        };

        profile.profile_setup_completed = true;
        self.inner
            .docstore
            .set(UserProfile::COLLECTION, account.uid.as_str(), &profile, true)
            .await?;

        self.inner.session.reload_profile().await;
        self.reroute_for_session();
        Ok(())
    }

    /// Place the cart as an order; clear the cart only after the write
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` when no user is signed in,
    /// `CheckoutError::EmptyCart` for an empty cart, or the document store
    /// failure. The cart is untouched on any failure.
    pub async fn checkout(&self) -> Result<OrderId, AppError> {
        let Some(account) = self.inner.session.snapshot().user().cloned() else {
            return Err(AppError::NotAuthenticated);
        };

        let cart_snapshot = self.with_cart(|cart| cart.clone());
        let (order_id, _order) =
            checkout::place_order(&self.inner.docstore, &account.uid, &cart_snapshot).await?;

        self.with_cart(Cart::clear);
        self.with_navigator(|nav| nav.reset(Screen::Home));
        Ok(order_id)
    }

    /// Route to home, onboarding, or login based on the session snapshot.
    fn reroute_for_session(&self) {
        let snapshot = self.inner.session.snapshot();
        let target = if snapshot.is_authenticated() {
            match snapshot.profile_setup_completed() {
                Some(true) => Screen::Home,
                // Incomplete, missing, or unloadable profile all route to setup.
                _ => Screen::ProfileSetup,
            }
        } else {
            Screen::Login
        };
        self.with_navigator(|nav| nav.reset(target));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockito::{Server, ServerGuard};
    use rust_decimal::Decimal;

    use arrivo_core::{CurrencyCode, Price, ProductId};

    use crate::models::Product;
    use crate::nav::ScreenParams;

    async fn state() -> (ServerGuard, AppState) {
        let server = Server::new_async().await;
        let config = AppConfig::for_endpoint(&server.url(), "test-key").unwrap();
        (server, AppState::new(config))
    }

    fn session_body(uid: &str) -> String {
        format!(
            r#"{{"uid": "{uid}", "email": "a@x.com", "displayName": "A",
                 "idToken": "idt", "refreshToken": "rft"}}"#
        )
    }

    fn product(id: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product {id}"),
            description: String::new(),
            price: Price::new(Decimal::from(price), CurrencyCode::USD),
            image_url: None,
            category: String::new(),
        }
    }

    #[tokio::test]
    async fn login_with_completed_profile_routes_home() {
        let (mut server, state) = state().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .with_status(200)
            .with_body(session_body("uid-1"))
            .create_async()
            .await;
        server
            .mock("GET", "/users/uid-1")
            .with_status(200)
            .with_body(r#"{"profileSetupCompleted": true}"#)
            .create_async()
            .await;

        state.login("a@x.com", "secret1").await.unwrap();

        let snapshot = state.session().snapshot();
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.profile_setup_completed(), Some(true));
        assert_eq!(state.with_navigator(|nav| nav.current()), Screen::Home);
    }

    #[tokio::test]
    async fn login_with_missing_profile_routes_to_setup() {
        let (mut server, state) = state().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .with_status(200)
            .with_body(session_body("uid-1"))
            .create_async()
            .await;
        server
            .mock("GET", "/users/uid-1")
            .with_status(404)
            .create_async()
            .await;

        state.login("a@x.com", "secret1").await.unwrap();

        assert_eq!(
            state.with_navigator(|nav| nav.current()),
            Screen::ProfileSetup
        );
    }

    #[tokio::test]
    async fn failed_login_leaves_session_and_navigation_alone() {
        let (mut server, state) = state().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .with_status(400)
            .with_body(r#"{"error": {"message": "INVALID_PASSWORD"}}"#)
            .create_async()
            .await;

        let err = state.login("a@x.com", "wrongpass").await.unwrap_err();

        assert!(matches!(err, AppError::Identity(_)));
        assert!(!state.session().snapshot().is_authenticated());
        assert_eq!(state.with_navigator(|nav| nav.current()), Screen::Login);
    }

    #[tokio::test]
    async fn checkout_requires_authentication() {
        let (_server, state) = state().await;
        state.with_cart(|cart| cart.add(product("a", 10)));

        let err = state.checkout().await.unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[tokio::test]
    async fn checkout_clears_cart_only_on_success() {
        let (mut server, state) = state().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .with_status(200)
            .with_body(session_body("uid-1"))
            .create_async()
            .await;
        server
            .mock("GET", "/users/uid-1")
            .with_status(200)
            .with_body(r#"{"profileSetupCompleted": true}"#)
            .create_async()
            .await;
        state.login("a@x.com", "secret1").await.unwrap();
        state.with_cart(|cart| {
            cart.add(product("a", 100));
            cart.add(product("b", 50));
        });

        // First attempt: backend down, cart must survive.
        let failing = server
            .mock("POST", "/orders")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        assert!(state.checkout().await.is_err());
        assert_eq!(state.with_cart(|cart| cart.item_count()), 2);
        failing.assert_async().await;

        // Retry succeeds and empties the cart.
        server
            .mock("POST", "/orders")
            .with_status(201)
            .with_body(r#"{"id": "ord-1"}"#)
            .create_async()
            .await;
        let order_id = state.checkout().await.unwrap();
        assert_eq!(order_id.as_str(), "ord-1");
        assert!(state.with_cart(|cart| cart.is_empty()));
    }

    #[tokio::test]
    async fn logout_clears_local_state() {
        let (mut server, state) = state().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .with_status(200)
            .with_body(session_body("uid-1"))
            .create_async()
            .await;
        server
            .mock("GET", "/users/uid-1")
            .with_status(200)
            .with_body(r#"{"profileSetupCompleted": true}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/token:revoke")
            .with_status(200)
            .create_async()
            .await;

        state.login("a@x.com", "secret1").await.unwrap();
        state.with_cart(|cart| cart.add(product("a", 10)));
        state.with_navigator(|nav| nav.navigate(Screen::Market, ScreenParams::None));

        state.logout().await.unwrap();

        assert!(!state.session().snapshot().is_authenticated());
        assert!(state.with_cart(|cart| cart.is_empty()));
        assert_eq!(state.with_navigator(|nav| nav.current()), Screen::Login);
    }

    #[tokio::test]
    async fn complete_profile_merges_and_routes_home() {
        let (mut server, state) = state().await;
        server
            .mock("POST", "/accounts:signInWithPassword")
            .with_status(200)
            .with_body(session_body("uid-1"))
            .create_async()
            .await;
        server
            .mock("GET", "/users/uid-1")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        state.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(
            state.with_navigator(|nav| nav.current()),
            Screen::ProfileSetup
        );

        let merge = server
            .mock("PATCH", "/users/uid-1")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "city": "Dubai",
                "profileSetupCompleted": true
            })))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/users/uid-1")
            .with_status(200)
            .with_body(r#"{"city": "Dubai", "profileSetupCompleted": true}"#)
            .create_async()
            .await;

        let profile = UserProfile {
            city: Some("Dubai".to_string()),
            ..UserProfile::default()
        };
        state.complete_profile(profile).await.unwrap();

        merge.assert_async().await;
        assert_eq!(
            state.session().snapshot().profile_setup_completed(),
            Some(true)
        );
        assert_eq!(state.with_navigator(|nav| nav.current()), Screen::Home);
    }
}

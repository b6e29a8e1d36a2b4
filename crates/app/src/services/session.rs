//! Session and profile observer.
//!
//! Tracks the identity state machine the screens route on:
//!
//! ```text
//! Unknown -> Unauthenticated
//!         -> Authenticated(ProfileLoading) -> Authenticated(ProfileReady)
//!                                          -> Authenticated(ProfileMissing)
//!                                          -> Authenticated(ProfileLoadFailed)
//! ```
//!
//! Every identity-state change triggers a profile fetch. A fetch failure
//! is fail-open: the user stays authenticated and the profile counts as
//! incomplete (routing them into setup), rather than blocking login.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::{Account, UserProfile};
use crate::services::docstore::DocStoreClient;

/// How far profile loading has gotten for an authenticated user.
#[derive(Debug, Clone)]
pub enum ProfileStatus {
    /// Fetch in flight.
    Loading,
    /// Profile document loaded.
    Ready(UserProfile),
    /// No profile document exists; treated as incomplete.
    Missing,
    /// Fetch failed; treated as incomplete, message kept for display.
    LoadFailed(String),
}

/// One immutable view of the session state machine.
#[derive(Debug, Clone, Default)]
pub enum SessionSnapshot {
    /// Before the first identity-state event arrives.
    #[default]
    Unknown,
    /// No user is signed in.
    Unauthenticated,
    /// A user is signed in; profile loading state rides along.
    Authenticated {
        account: Account,
        profile: ProfileStatus,
    },
}

impl SessionSnapshot {
    /// The signed-in account, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&Account> {
        match self {
            Self::Authenticated { account, .. } => Some(account),
            _ => None,
        }
    }

    /// The loaded profile, if any.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated {
                profile: ProfileStatus::Ready(profile),
                ..
            } => Some(profile),
            _ => None,
        }
    }

    /// True while the initial identity state or the profile is unresolved.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::Unknown
                | Self::Authenticated {
                    profile: ProfileStatus::Loading,
                    ..
                }
        )
    }

    /// True when a user is signed in, whatever the profile state.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Tri-state onboarding flag: `None` while unknown or loading,
    /// otherwise whether profile setup finished. A missing or unloadable
    /// profile counts as not finished.
    #[must_use]
    pub fn profile_setup_completed(&self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Unauthenticated => Some(false),
            Self::Authenticated { profile, .. } => match profile {
                ProfileStatus::Loading => None,
                ProfileStatus::Ready(p) => Some(p.profile_setup_completed),
                ProfileStatus::Missing | ProfileStatus::LoadFailed(_) => Some(false),
            },
        }
    }

    /// Message of the last profile load failure, if that is where we are.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Authenticated {
                profile: ProfileStatus::LoadFailed(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// Observer feeding session state to every screen.
///
/// Screens hold a [`watch::Receiver`] and re-render on change; whoever
/// drives identity (login screen, app start) calls [`Self::auth_changed`].
pub struct SessionObserver {
    docstore: DocStoreClient,
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionObserver {
    /// Create an observer in the `Unknown` state.
    #[must_use]
    pub fn new(docstore: DocStoreClient) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::Unknown);
        Self { docstore, tx }
    }

    /// Subscribe to session-state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Current state, cloned.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Feed an identity-state change into the machine.
    ///
    /// `None` means signed out. `Some` flips the state to authenticated
    /// with the profile loading, then resolves the profile fetch into
    /// `Ready`, `Missing`, or `LoadFailed`.
    pub async fn auth_changed(&self, account: Option<Account>) {
        let Some(account) = account else {
            debug!("identity state: signed out");
            self.tx.send_replace(SessionSnapshot::Unauthenticated);
            return;
        };

        debug!(uid = %account.uid, "identity state: signed in, loading profile");
        self.tx.send_replace(SessionSnapshot::Authenticated {
            account: account.clone(),
            profile: ProfileStatus::Loading,
        });

        let profile = self.fetch_profile(&account).await;
        self.tx.send_replace(SessionSnapshot::Authenticated {
            account,
            profile,
        });
    }

    /// Refetch the profile for the currently signed-in user.
    ///
    /// Used after profile-setup writes. No-op when signed out.
    pub async fn reload_profile(&self) {
        let Some(account) = self.snapshot().user().cloned() else {
            return;
        };

        let profile = self.fetch_profile(&account).await;
        self.tx.send_replace(SessionSnapshot::Authenticated {
            account,
            profile,
        });
    }

    async fn fetch_profile(&self, account: &Account) -> ProfileStatus {
        match self
            .docstore
            .get::<UserProfile>(UserProfile::COLLECTION, account.uid.as_str())
            .await
        {
            Ok(Some(profile)) => ProfileStatus::Ready(profile),
            Ok(None) => {
                debug!(uid = %account.uid, "no profile document, forcing setup");
                ProfileStatus::Missing
            }
            Err(err) => {
                // Fail open: an unreadable profile must not block login.
                warn!(uid = %account.uid, error = %err, "profile load failed");
                ProfileStatus::LoadFailed(err.to_string())
            }
        }
    }
}

//! The authenticated account returned by the identity provider.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use arrivo_core::{Email, UserId};

/// An authenticated account.
///
/// Opaque handle returned by the identity provider; the matching
/// `UserProfile` document lives in the `users` collection keyed by
/// [`Account::uid`]. Tokens are held as secrets and never serialized.
#[derive(Clone)]
pub struct Account {
    /// Identity-provider UID; also the profile document ID.
    pub uid: UserId,
    /// Verified email address.
    pub email: Email,
    /// Display name, when the provider has one.
    pub display_name: Option<String>,
    /// Avatar URL from the provider (federated logins usually set this).
    pub photo_url: Option<String>,
    /// Account creation time, when the provider reports it.
    pub created_at: Option<DateTime<Utc>>,
    id_token: SecretString,
    refresh_token: SecretString,
}

impl Account {
    /// Assemble an account from provider-session fields.
    #[must_use]
    pub fn new(
        uid: UserId,
        email: Email,
        display_name: Option<String>,
        photo_url: Option<String>,
        created_at: Option<DateTime<Utc>>,
        id_token: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            uid,
            email,
            display_name,
            photo_url,
            created_at,
            id_token,
            refresh_token,
        }
    }

    /// Short-lived token proving this session to the backends.
    #[must_use]
    pub const fn id_token(&self) -> &SecretString {
        &self.id_token
    }

    /// Long-lived token revoked at logout.
    #[must_use]
    pub const fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("created_at", &self.created_at)
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

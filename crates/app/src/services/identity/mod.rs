//! Identity provider client.
//!
//! Registration, credential login, federated login, and logout against the
//! external managed identity service. Account records live with the
//! provider; the matching profile documents live in the document store's
//! `users` collection, written through [`DocStoreClient`].
//!
//! Two write-ordering hazards from the original design are closed here:
//! the post-registration profile write rolls the new account back if it
//! fails, and the federated first-login profile write is a conditional
//! create, so concurrent first logins cannot race.

mod error;

pub use error::IdentityError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use arrivo_core::{Email, UserId};

use crate::config::IdentityConfig;
use crate::models::{Account, UserProfile};
use crate::services::docstore::{DocStoreClient, DocStoreError};

/// Minimum password length accepted by the provider.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Provider ID sent for Google federated sign-in.
const GOOGLE_PROVIDER_ID: &str = "google.com";

/// Client for the managed identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    docstore: DocStoreClient,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignInRequest<'a> {
    provider_id: &'a str,
    id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeTokenRequest<'a> {
    refresh_token: &'a str,
}

/// Session payload the provider returns from every sign-in shaped call.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    uid: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    id_token: String,
    refresh_token: String,
}

impl SessionResponse {
    /// Build the in-memory account, distrusting the provider's email just
    /// enough to re-validate it.
    fn into_account(self) -> Result<Account, IdentityError> {
        let email = Email::parse(&self.email).map_err(|_| {
            IdentityError::Provider("identity provider returned a malformed email".to_string())
        })?;

        Ok(Account::new(
            UserId::new(self.uid),
            email,
            self.display_name,
            self.photo_url,
            self.created_at,
            SecretString::from(self.id_token),
            SecretString::from(self.refresh_token),
        ))
    }
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

// =============================================================================
// IdentityClient
// =============================================================================

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// The document store client is used for the profile documents that
    /// accompany accounts.
    #[must_use]
    pub fn new(config: &IdentityConfig, docstore: DocStoreClient) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
                docstore,
            }),
        }
    }

    /// Register a new account with email and password.
    ///
    /// Email and password are validated before any network call. On
    /// provider success an initial profile document is written; if that
    /// write fails, the freshly created account is deleted again so no
    /// profileless account is left behind.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidEmail` / `WeakPassword` for local
    /// validation failures, translated provider errors for rejections, and
    /// `ProfileCreation` when the profile write (and possibly its
    /// rollback) failed.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        phone: Option<&str>,
    ) -> Result<Account, IdentityError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let session = self
            .post_session(
                "accounts:signUp",
                &SignUpRequest {
                    email: email.as_str(),
                    password,
                    display_name,
                    phone,
                },
            )
            .await?;
        let account = session.into_account()?;

        let mut profile = UserProfile::initial(account.email.as_str(), display_name);
        profile.phone = phone.map(ToOwned::to_owned);

        match self
            .inner
            .docstore
            .create(UserProfile::COLLECTION, account.uid.as_str(), &profile)
            .await
        {
            Ok(()) => {}
            // A leftover profile under a brand-new UID is fine to keep.
            Err(DocStoreError::AlreadyExists { .. }) => {}
            Err(profile_err) => {
                let account_deleted = match self.delete_account(&account).await {
                    Ok(()) => true,
                    Err(rollback_err) => {
                        warn!(
                            uid = %account.uid,
                            error = %rollback_err,
                            "account rollback failed after profile write failure"
                        );
                        false
                    }
                };
                return Err(IdentityError::ProfileCreation {
                    source: profile_err,
                    account_deleted,
                });
            }
        }

        info!(uid = %account.uid, "account registered");
        Ok(account)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidEmail` for malformed input, and the
    /// translated provider error otherwise (unmapped provider codes pass
    /// through raw).
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, IdentityError> {
        let email = Email::parse(email)?;

        let session = self
            .post_session(
                "accounts:signInWithPassword",
                &SignInRequest {
                    email: email.as_str(),
                    password,
                },
            )
            .await?;
        let account = session.into_account()?;

        info!(uid = %account.uid, "logged in");
        Ok(account)
    }

    /// Login with a Google ID token from the platform sign-in sheet.
    ///
    /// The first login creates the profile document through a conditional
    /// create; a profile that already exists is success, so concurrent
    /// first logins converge on one profile.
    ///
    /// # Errors
    ///
    /// Returns the translated provider error for rejections, or
    /// `IdentityError::DocStore` when the profile create fails for any
    /// reason other than already existing.
    pub async fn login_with_google(&self, id_token: &str) -> Result<Account, IdentityError> {
        let session = self
            .post_session(
                "accounts:signInWithIdp",
                &IdpSignInRequest {
                    provider_id: GOOGLE_PROVIDER_ID,
                    id_token,
                },
            )
            .await?;
        let account = session.into_account()?;

        let profile = UserProfile {
            email: Some(account.email.as_str().to_owned()),
            display_name: account.display_name.clone(),
            photo_url: account.photo_url.clone(),
            ..UserProfile::default()
        };
        match self
            .inner
            .docstore
            .create(UserProfile::COLLECTION, account.uid.as_str(), &profile)
            .await
        {
            Ok(()) => info!(uid = %account.uid, "first federated login, profile created"),
            Err(DocStoreError::AlreadyExists { .. }) => {}
            Err(err) => return Err(err.into()),
        }

        info!(uid = %account.uid, "logged in with google");
        Ok(account)
    }

    /// Logout: revoke the refresh token so the session cannot be renewed.
    ///
    /// # Errors
    ///
    /// Returns the translated provider error when revocation fails.
    pub async fn logout(&self, account: &Account) -> Result<(), IdentityError> {
        self.post_ok(
            "token:revoke",
            &RevokeTokenRequest {
                refresh_token: account.refresh_token().expose_secret(),
            },
        )
        .await?;

        info!(uid = %account.uid, "logged out");
        Ok(())
    }

    /// Delete the account behind `account`'s session.
    async fn delete_account(&self, account: &Account) -> Result<(), IdentityError> {
        self.post_ok(
            "accounts:delete",
            &DeleteAccountRequest {
                id_token: account.id_token().expose_secret(),
            },
        )
        .await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn url_for(&self, op: &str) -> Result<Url, IdentityError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| IdentityError::InvalidEndpoint("base URL cannot be a base".to_string()))?;
            segments.pop_if_empty().push(op);
        }
        Ok(url)
    }

    /// POST an operation, translating provider failures.
    async fn post_raw<B: Serialize>(
        &self,
        op: &str,
        body: &B,
    ) -> Result<reqwest::Response, IdentityError> {
        let url = self.url_for(op)?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(&self.inner.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(IdentityError::RateLimited);
        }

        let text = response.text().await.unwrap_or_default();
        let raw = serde_json::from_str::<ProviderErrorBody>(&text).map_or_else(
            |_| format!("HTTP {status}: {}", text.chars().take(200).collect::<String>()),
            |body| body.error.message,
        );
        warn!(op, code = %raw, "identity provider rejected request");
        Err(IdentityError::from_provider_code(&raw))
    }

    /// POST an operation and parse a session payload out of the response.
    async fn post_session<B: Serialize>(
        &self,
        op: &str,
        body: &B,
    ) -> Result<SessionResponse, IdentityError> {
        let response = self.post_raw(op, body).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST an operation where only success matters.
    async fn post_ok<B: Serialize>(&self, op: &str, body: &B) -> Result<(), IdentityError> {
        self.post_raw(op, body).await?;
        Ok(())
    }
}

/// Validate password meets the provider minimum before any network call.
fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

//! Identity error types and provider-code translation.

use thiserror::Error;

use arrivo_core::EmailError;

use crate::services::docstore::DocStoreError;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Email failed local validation, or the provider rejected it.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password shorter than the provider minimum.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum accepted length.
        min: usize,
    },

    /// Wrong password or no such account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration hit an email that already has an account.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// Provider throttled this client.
    #[error("too many attempts")]
    RateLimited,

    /// The user dismissed the federated sign-in flow.
    #[error("sign-in flow cancelled")]
    FlowCancelled,

    /// Operation disabled for this project.
    #[error("operation not allowed")]
    Unauthorized,

    /// Unmapped provider code; the raw message passes through.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("invalid identity endpoint: {0}")]
    InvalidEndpoint(String),

    /// Profile document write failed after the account was created.
    ///
    /// `account_deleted` reports whether the compensating account deletion
    /// succeeded; when false, an account without a profile exists and the
    /// user should retry registration support-side.
    #[error("profile creation failed after account creation: {source}")]
    ProfileCreation {
        /// The failed profile write.
        #[source]
        source: DocStoreError,
        /// Whether the new account was rolled back.
        account_deleted: bool,
    },

    /// Document store failure outside the register rollback path.
    #[error("document store error: {0}")]
    DocStore(#[from] DocStoreError),
}

impl IdentityError {
    /// Translate a provider error code into the matching variant.
    ///
    /// The provider reports codes like `INVALID_PASSWORD` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`; the
    /// token before any ` : ` suffix is what gets matched. Unmapped codes
    /// pass the raw message through as [`IdentityError::Provider`].
    #[must_use]
    pub fn from_provider_code(raw: &str) -> Self {
        let code = raw.split(':').next().unwrap_or(raw).trim();
        match code {
            "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidCredentials
            }
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" => Self::WeakPassword { min: 6 },
            "INVALID_EMAIL" => {
                Self::InvalidEmail(EmailError::Malformed("rejected by identity provider"))
            }
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::RateLimited,
            "FLOW_CANCELLED" | "POPUP_CLOSED_BY_USER" => Self::FlowCancelled,
            "OPERATION_NOT_ALLOWED" | "ADMIN_ONLY_OPERATION" => Self::Unauthorized,
            _ => Self::Provider(raw.to_string()),
        }
    }

    /// Text safe to render inline on the login and registration screens.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::WeakPassword { min } => {
                format!("Password must be at least {min} characters.")
            }
            Self::InvalidCredentials => "Incorrect email or password.".to_string(),
            Self::EmailAlreadyInUse => {
                "An account with this email already exists.".to_string()
            }
            Self::RateLimited => "Too many attempts. Please try again later.".to_string(),
            Self::FlowCancelled => "Sign-in was cancelled.".to_string(),
            Self::Unauthorized => "This sign-in method is not enabled.".to_string(),
            Self::Provider(raw) => raw.clone(),
            Self::Http(_) | Self::Parse(_) | Self::InvalidEndpoint(_) => {
                "Could not reach the sign-in service. Check your connection.".to_string()
            }
            Self::ProfileCreation { .. } | Self::DocStore(_) => {
                "We couldn't finish setting up your account. Please try again.".to_string()
            }
        }
    }
}

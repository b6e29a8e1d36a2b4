//! Unified error handling.
//!
//! Provides a unified `AppError` type aggregating the per-service errors,
//! plus the translation into user-facing text. Screens render
//! [`AppError::user_message`] inline; nothing in this crate panics or
//! retries on failure.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::services::blobstore::BlobStoreError;
use crate::services::docstore::DocStoreError;
use crate::services::identity::IdentityError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Document database operation failed.
    #[error("Document store error: {0}")]
    DocStore(#[from] DocStoreError),

    /// Object storage operation failed.
    #[error("Blob store error: {0}")]
    BlobStore(#[from] BlobStoreError),

    /// Identity provider operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Operation needs a signed-in user.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl AppError {
    /// Text safe to render inline in a screen.
    ///
    /// Transport details stay in the logs; identity errors translate to the
    /// fixed per-code messages, with unmapped provider codes passed through
    /// verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "The app is misconfigured. Please reinstall or contact support.".to_string(),
            Self::DocStore(err) => match err {
                DocStoreError::PermissionDenied(_) => {
                    "You don't have access to this data.".to_string()
                }
                DocStoreError::RateLimited(_) => {
                    "Too many requests. Please try again in a moment.".to_string()
                }
                _ => "Something went wrong loading your data. Please try again.".to_string(),
            },
            Self::BlobStore(_) => "Uploading the image failed. Please try again.".to_string(),
            Self::Identity(err) => err.user_message(),
            Self::Checkout(CheckoutError::EmptyCart) => {
                "Your cart is empty.".to_string()
            }
            Self::Checkout(_) => "Placing your order failed. Please try again.".to_string(),
            Self::NotAuthenticated => "Please sign in first.".to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ARRIVO_API_KEY` - project API key sent to all three managed backends
//!
//! ## Optional
//! - `ARRIVO_DOCSTORE_URL` - document database endpoint
//!   (default: `https://data.arrivo.app/v1`)
//! - `ARRIVO_BLOBSTORE_URL` - object storage endpoint
//!   (default: `https://media.arrivo.app/v1`)
//! - `ARRIVO_IDENTITY_URL` - identity provider endpoint
//!   (default: `https://identity.arrivo.app/v1`)

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DOCSTORE_URL: &str = "https://data.arrivo.app/v1";
const DEFAULT_BLOBSTORE_URL: &str = "https://media.arrivo.app/v1";
const DEFAULT_IDENTITY_URL: &str = "https://identity.arrivo.app/v1";

const MIN_API_KEY_LENGTH: usize = 20;

/// Placeholder patterns an API key must not contain (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "example", "placeholder", "xxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Document database client configuration.
    pub docstore: DocStoreConfig,
    /// Object storage client configuration.
    pub blobstore: BlobStoreConfig,
    /// Identity provider client configuration.
    pub identity: IdentityConfig,
}

/// Document database endpoint configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct DocStoreConfig {
    /// Endpoint the client round-trips to, e.g. `https://data.arrivo.app/v1`.
    pub base_url: Url,
    /// Project API key.
    pub api_key: SecretString,
}

/// Object storage endpoint configuration.
#[derive(Clone)]
pub struct BlobStoreConfig {
    /// Endpoint serving path-addressed blobs.
    pub base_url: Url,
    /// Project API key.
    pub api_key: SecretString,
}

/// Identity provider endpoint configuration.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Endpoint for account and token operations.
    pub base_url: Url,
    /// Project API key.
    pub api_key: SecretString,
}

macro_rules! redacted_debug {
    ($type:ty, $name:literal) => {
        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct($name)
                    .field("base_url", &self.base_url.as_str())
                    .field("api_key", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

redacted_debug!(DocStoreConfig, "DocStoreConfig");
redacted_debug!(BlobStoreConfig, "BlobStoreConfig");
redacted_debug!(IdentityConfig, "IdentityConfig");

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API key is missing or fails validation,
    /// or if an endpoint URL cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = get_validated_secret("ARRIVO_API_KEY")?;

        let docstore_url = get_url_or_default("ARRIVO_DOCSTORE_URL", DEFAULT_DOCSTORE_URL)?;
        let blobstore_url = get_url_or_default("ARRIVO_BLOBSTORE_URL", DEFAULT_BLOBSTORE_URL)?;
        let identity_url = get_url_or_default("ARRIVO_IDENTITY_URL", DEFAULT_IDENTITY_URL)?;

        Ok(Self {
            docstore: DocStoreConfig {
                base_url: docstore_url,
                api_key: api_key.clone(),
            },
            blobstore: BlobStoreConfig {
                base_url: blobstore_url,
                api_key: api_key.clone(),
            },
            identity: IdentityConfig {
                base_url: identity_url,
                api_key,
            },
        })
    }

    /// Build a configuration pointing every service at one base URL.
    ///
    /// Used by tests and local development against an emulator that hosts
    /// all three APIs on a single port.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a valid URL.
    pub fn for_endpoint(base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_string(), e.to_string()))?;
        let key = SecretString::from(api_key);

        Ok(Self {
            docstore: DocStoreConfig {
                base_url: url.clone(),
                api_key: key.clone(),
            },
            blobstore: BlobStoreConfig {
                base_url: url.clone(),
                api_key: key.clone(),
            },
            identity: IdentityConfig {
                base_url: url,
                api_key: key,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable as a parsed URL, falling back to a default.
fn get_url_or_default(key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_API_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_API_KEY_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

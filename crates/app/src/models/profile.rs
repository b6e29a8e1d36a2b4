//! User profile document stored in the `users` collection.

use serde::{Deserialize, Serialize};

/// Profile document keyed by identity-provider UID.
///
/// Document shape is a convention, not a constraint: every field defaults
/// so partially-written profiles (a registration that never finished
/// onboarding) still deserialize. `profile_setup_completed` gates the
/// onboarding-vs-home routing decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Email, duplicated from the identity provider for display.
    pub email: Option<String>,
    /// Display name chosen at registration.
    pub display_name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Country of residence.
    pub country: Option<String>,
    /// City of residence.
    pub city: Option<String>,
    /// Nationality (drives visa and family-help eligibility screens).
    pub nationality: Option<String>,
    /// Profile picture URL in the blob store.
    pub photo_url: Option<String>,
    /// Whether onboarding finished; false routes to profile setup.
    pub profile_setup_completed: bool,
}

impl UserProfile {
    /// Collection holding one profile document per account, keyed by UID.
    pub const COLLECTION: &'static str = "users";

    /// Minimal profile written at registration.
    #[must_use]
    pub fn initial(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }
}

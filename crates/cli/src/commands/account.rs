//! Account management commands.

use tracing::info;

use arrivo_app::AppConfig;
use arrivo_app::models::UserProfile;
use arrivo_app::services::{DocStoreClient, IdentityClient};

/// Register a new account through the real flow: identity provider
/// account plus the initial profile document.
///
/// # Errors
///
/// Returns an error if configuration is missing or the identity provider
/// rejects the registration.
pub async fn register(
    email: &str,
    password: &str,
    name: &str,
    phone: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let docstore = DocStoreClient::new(&config.docstore);
    let identity = IdentityClient::new(&config.identity, docstore);

    let account = identity.register(email, password, name, phone).await?;

    info!("Account created");
    info!("  UID: {}", account.uid);
    info!("  Email: {}", account.email);
    if let Some(display_name) = &account.display_name {
        info!("  Display name: {display_name}");
    }
    Ok(())
}

/// Fetch and print the profile document for a UID.
///
/// # Errors
///
/// Returns an error if configuration is missing or the document store
/// request fails. A missing profile is reported, not an error.
pub async fn show(uid: &str) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let docstore = DocStoreClient::new(&config.docstore);

    match docstore
        .get::<UserProfile>(UserProfile::COLLECTION, uid)
        .await?
    {
        Some(profile) => {
            info!("Profile for {uid}");
            info!("  Email: {}", profile.email.as_deref().unwrap_or("-"));
            info!(
                "  Display name: {}",
                profile.display_name.as_deref().unwrap_or("-")
            );
            info!("  Phone: {}", profile.phone.as_deref().unwrap_or("-"));
            info!("  Country: {}", profile.country.as_deref().unwrap_or("-"));
            info!("  City: {}", profile.city.as_deref().unwrap_or("-"));
            info!(
                "  Nationality: {}",
                profile.nationality.as_deref().unwrap_or("-")
            );
            info!("  Setup completed: {}", profile.profile_setup_completed);
        }
        None => info!("No profile document for {uid}"),
    }
    Ok(())
}

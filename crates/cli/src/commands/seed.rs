//! Seed the document store with demo catalog data.
//!
//! The demo entities previously hardcoded as screen fallbacks live here
//! instead: a freshly seeded backend gives every screen real documents to
//! read. Seeding writes at fixed IDs with full overwrites, so re-running
//! it resets the catalog rather than duplicating it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use arrivo_app::AppConfig;
use arrivo_app::models::{Event, Helper, Listing, Product, ServiceOffer, Space};
use arrivo_app::services::DocStoreClient;
use arrivo_core::{
    CurrencyCode, EventId, HelperId, ListingId, Price, ProductId, ServiceId, SpaceId,
};

/// Seed the demo catalog.
///
/// # Arguments
///
/// * `only` - When set, seed just this collection
///
/// # Errors
///
/// Returns an error if configuration is missing, the collection name is
/// unknown, or a write fails. Writes are not transactional; a failure
/// partway leaves earlier collections seeded.
pub async fn catalog(only: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let docstore = DocStoreClient::new(&config.docstore);

    const COLLECTIONS: &[&str] = &[
        "products", "services", "spaces", "events", "listings", "helpers",
    ];
    if let Some(name) = only
        && !COLLECTIONS.contains(&name)
    {
        return Err(format!(
            "unknown collection {name:?}, expected one of {COLLECTIONS:?}"
        )
        .into());
    }
    let wants = |name: &str| only.is_none_or(|o| o == name);

    let mut written = 0usize;

    if wants("products") {
        for product in demo_products() {
            docstore
                .set("products", product.id.as_str(), &product, false)
                .await?;
            written += 1;
        }
        info!("products seeded");
    }
    if wants("services") {
        for service in demo_services() {
            docstore
                .set("services", service.id.as_str(), &service, false)
                .await?;
            written += 1;
        }
        info!("services seeded");
    }
    if wants("spaces") {
        for space in demo_spaces() {
            docstore
                .set("spaces", space.id.as_str(), &space, false)
                .await?;
            written += 1;
        }
        info!("spaces seeded");
    }
    if wants("events") {
        for event in demo_events()? {
            docstore
                .set("events", event.id.as_str(), &event, false)
                .await?;
            written += 1;
        }
        info!("events seeded");
    }
    if wants("listings") {
        for listing in demo_listings() {
            docstore
                .set("listings", listing.id.as_str(), &listing, false)
                .await?;
            written += 1;
        }
        info!("listings seeded");
    }
    if wants("helpers") {
        for helper in demo_helpers() {
            docstore
                .set("helpers", helper.id.as_str(), &helper, false)
                .await?;
            written += 1;
        }
        info!("helpers seeded");
    }

    info!("Seeding complete!");
    info!("  Documents written: {written}");
    Ok(())
}

fn usd(amount: i64) -> Price {
    Price::new(Decimal::from(amount), CurrencyCode::USD)
}

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("prod-sim-kit"),
            name: "SIM starter kit".to_string(),
            description: "Local SIM with 30 days of data, activated on arrival.".to_string(),
            price: usd(15),
            image_url: None,
            category: "essentials".to_string(),
        },
        Product {
            id: ProductId::new("prod-adapter-set"),
            name: "Power adapter set".to_string(),
            description: "Type C/G adapters plus a universal strip.".to_string(),
            price: usd(24),
            image_url: None,
            category: "essentials".to_string(),
        },
        Product {
            id: ProductId::new("prod-welcome-box"),
            name: "Kitchen welcome box".to_string(),
            description: "Pans, plates, and cutlery for the first week.".to_string(),
            price: usd(89),
            image_url: None,
            category: "home".to_string(),
        },
    ]
}

fn demo_services() -> Vec<ServiceOffer> {
    vec![
        ServiceOffer {
            id: ServiceId::new("svc-gp-checkup"),
            name: "General checkup".to_string(),
            specialty: Some("General practice".to_string()),
            description: "45-minute intake consultation, English-speaking.".to_string(),
            price: usd(60),
            image_url: None,
        },
        ServiceOffer {
            id: ServiceId::new("svc-dental-clean"),
            name: "Dental cleaning".to_string(),
            specialty: Some("Dentistry".to_string()),
            description: String::new(),
            price: usd(75),
            image_url: None,
        },
    ]
}

fn demo_spaces() -> Vec<Space> {
    vec![
        Space {
            id: SpaceId::new("spc-harbor-hub"),
            name: "Harbor Hub".to_string(),
            location: "Downtown".to_string(),
            price: usd(18),
            amenities: vec!["wifi".to_string(), "meeting rooms".to_string()],
        },
        Space {
            id: SpaceId::new("spc-garden-desk"),
            name: "Garden Desk".to_string(),
            location: "Old town".to_string(),
            price: usd(12),
            amenities: vec!["wifi".to_string(), "coffee".to_string()],
        },
    ]
}

fn demo_events() -> Result<Vec<Event>, chrono::ParseError> {
    let starts = |s: &str| s.parse::<DateTime<Utc>>();
    Ok(vec![
        Event {
            id: EventId::new("ev-newcomers-meetup"),
            title: "Newcomers meetup".to_string(),
            venue: "Marina walk".to_string(),
            starts_at: starts("2026-09-01T18:00:00Z")?,
            price: None,
            image_url: None,
        },
        Event {
            id: EventId::new("ev-language-cafe"),
            title: "Language exchange cafe".to_string(),
            venue: "Harbor Hub".to_string(),
            starts_at: starts("2026-09-08T19:30:00Z")?,
            price: Some(usd(5)),
            image_url: None,
        },
    ])
}

fn demo_listings() -> Vec<Listing> {
    vec![
        Listing {
            id: ListingId::new("ls-2br-metro"),
            title: "2BR near metro".to_string(),
            district: "Al Barsha".to_string(),
            rent: Price::new(Decimal::from(1200), CurrencyCode::USD),
            bedrooms: 2,
            furnished: true,
        },
        Listing {
            id: ListingId::new("ls-studio-oldtown"),
            title: "Studio in old town".to_string(),
            district: "Deira".to_string(),
            rent: Price::new(Decimal::from(700), CurrencyCode::USD),
            bedrooms: 0,
            furnished: false,
        },
    ]
}

fn demo_helpers() -> Vec<Helper> {
    vec![
        Helper {
            id: HelperId::new("hlp-nanny-leila"),
            name: "Leila".to_string(),
            city: "Dubai".to_string(),
            hourly_rate: usd(14),
            skills: vec!["childcare".to_string(), "first aid".to_string()],
        },
        Helper {
            id: HelperId::new("hlp-tutor-marc"),
            name: "Marc".to_string(),
            city: "Dubai".to_string(),
            hourly_rate: usd(22),
            skills: vec!["tutoring".to_string(), "french".to_string()],
        },
    ]
}

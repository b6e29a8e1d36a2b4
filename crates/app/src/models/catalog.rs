//! Catalog document shapes, one per business module.
//!
//! Each screen reads its own collection: `products`, `services`, `spaces`,
//! `events`, `listings`, `helpers`. The document store enforces no schema;
//! these structs are the read-time convention, with defaults wherever a
//! seeded or hand-edited document may omit a field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arrivo_core::{EventId, HelperId, ListingId, Price, ProductId, ServiceId, SpaceId};

/// A purchasable product in the market module (`products` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: String,
}

/// A bookable health service (`services` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffer {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A coworking space (`spaces` collection). Price is per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    pub location: String,
    pub price: Price,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// A community event (`events` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub venue: String,
    pub starts_at: DateTime<Utc>,
    /// Absent for free events.
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A housing listing (`listings` collection). Rent is per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub district: String,
    pub rent: Price,
    #[serde(default)]
    pub bedrooms: u8,
    #[serde(default)]
    pub furnished: bool,
}

/// A family-help provider (`helpers` collection). Rate is per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Helper {
    pub id: HelperId,
    pub name: String,
    pub city: String,
    pub hourly_rate: Price,
    #[serde(default)]
    pub skills: Vec<String>,
}

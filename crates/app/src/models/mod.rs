//! Data models shared across the application kernel.

pub mod account;
pub mod catalog;
pub mod profile;

pub use account::Account;
pub use catalog::{Event, Helper, Listing, Product, ServiceOffer, Space};
pub use profile::UserProfile;

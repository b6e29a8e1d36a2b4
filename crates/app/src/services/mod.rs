//! Clients for the three external managed services, plus the session
//! observer built on top of them.
//!
//! # Architecture
//!
//! - Each client wraps `reqwest` behind an `Arc` so it is cheaply cloneable
//! - Every call round-trips to the backend: no retry, no offline queue,
//!   no cache
//! - Failures surface as typed errors; callers translate them into
//!   user-facing text via [`crate::error::AppError`]

pub mod blobstore;
pub mod docstore;
pub mod identity;
pub mod session;

pub use blobstore::{BlobStoreClient, BlobStoreError};
pub use docstore::{DocStoreClient, DocStoreError, FilterOp, Query};
pub use identity::{IdentityClient, IdentityError};
pub use session::{SessionObserver, SessionSnapshot};

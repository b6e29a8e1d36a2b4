//! Document database client.
//!
//! Generic typed CRUD over named collections of JSON documents keyed by
//! string IDs. The backend is an external managed document database; this
//! client owns nothing but the HTTP round-trip and (de)serialization.
//!
//! # Contract
//!
//! - `get` on a missing document returns `None`, never an error
//! - `set` with `merge = false` overwrites the whole document; with
//!   `merge = true` it upserts, preserving fields absent from the payload
//! - `create` is create-if-absent in a single conditional request, so
//!   concurrent first writers cannot race each other
//! - No retry, no offline queue, no caching - every call round-trips

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use arrivo_core::DocumentId;

use crate::config::DocStoreConfig;

/// Errors that can occur when talking to the document database.
#[derive(Debug, Error)]
pub enum DocStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Collection name or document ID cannot form a request URL.
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    /// Backend rejected the credentials or the rules denied access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Mutating operation targeted a document that does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document ID.
        id: String,
    },

    /// Conditional create found the document already present.
    #[error("document already exists: {collection}/{id}")]
    AlreadyExists {
        /// Collection name.
        collection: String,
        /// Document ID.
        id: String,
    },

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },
}

/// A query over one collection: field filters plus an optional limit.
///
/// Only equality and range operators exist here; anything needing a
/// composite index is the backend's problem, not this client's.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Query {
    filters: Vec<FieldFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl Query {
    /// Start an empty query (matches every document).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field filter.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Cap the number of returned documents.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Comparison operators supported by the backend's query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Serialize)]
struct FieldFilter {
    field: String,
    op: FilterOp,
    value: serde_json::Value,
}

/// Response body of an add-with-generated-id request.
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Error body shape the backend uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for the managed document database.
#[derive(Clone)]
pub struct DocStoreClient {
    inner: Arc<DocStoreClientInner>,
}

struct DocStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl DocStoreClient {
    /// Create a new document database client.
    #[must_use]
    pub fn new(config: &DocStoreConfig) -> Self {
        Self {
            inner: Arc::new(DocStoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch a document by ID.
    ///
    /// A missing document is `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError` on transport or permission failure, or when
    /// the document body does not deserialize into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, DocStoreError> {
        let url = self.url_for(&[collection, id])?;
        let response = self.send(self.inner.client.get(url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(collection, id, "document not found");
            return Ok(None);
        }
        let response = check_status(response, collection, id).await?;

        Ok(Some(parse_body(response).await?))
    }

    /// Fetch every document in a collection as one materialized list.
    ///
    /// There is no pagination; collections in this system are small.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError` on transport, permission, or parse failure.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, DocStoreError> {
        let url = self.url_for(&[collection])?;
        let response = self.send(self.inner.client.get(url)).await?;
        let response = check_status(response, collection, "").await?;

        let documents: Vec<T> = parse_body(response).await?;
        debug!(collection, count = documents.len(), "fetched collection");
        Ok(documents)
    }

    /// Run a filtered query against one collection.
    ///
    /// Composite-index planning is delegated to the backend; this client
    /// only ships the filters.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError` on transport, permission, or parse failure.
    pub async fn query<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<T>, DocStoreError> {
        let op = format!("{collection}:query");
        let url = self.url_for(&[op.as_str()])?;
        let response = self
            .send(self.inner.client.post(url).json(query))
            .await?;
        let response = check_status(response, collection, "").await?;

        Ok(parse_body(response).await?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write a document at a known ID.
    ///
    /// With `merge = false` the stored document becomes exactly `value`.
    /// With `merge = true` fields absent from `value` are preserved. Both
    /// forms upsert.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError` on transport or permission failure.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
        merge: bool,
    ) -> Result<(), DocStoreError> {
        let url = self.url_for(&[collection, id])?;
        let request = if merge {
            self.inner.client.patch(url)
        } else {
            self.inner.client.put(url)
        };

        let response = self.send(request.json(value)).await?;
        check_status(response, collection, id).await?;
        debug!(collection, id, merge, "document written");
        Ok(())
    }

    /// Merge fields into an existing document.
    ///
    /// Unlike [`Self::set`] with `merge = true`, this refuses to create the
    /// document when absent.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError::NotFound` when the document does not exist,
    /// otherwise the usual transport and permission errors.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
    ) -> Result<(), DocStoreError> {
        let url = self.url_for(&[collection, id])?;
        let response = self
            .send(
                self.inner
                    .client
                    .patch(url)
                    .header(reqwest::header::IF_MATCH, "*")
                    .json(value),
            )
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DocStoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response, collection, id).await?;
        debug!(collection, id, "document updated");
        Ok(())
    }

    /// Create a document only if it does not already exist.
    ///
    /// The existence condition rides on the request itself, so two
    /// concurrent first writers cannot both win.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError::AlreadyExists` when the document is already
    /// present, otherwise the usual transport and permission errors.
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
    ) -> Result<(), DocStoreError> {
        let url = self.url_for(&[collection, id])?;
        let response = self
            .send(
                self.inner
                    .client
                    .put(url)
                    .header(reqwest::header::IF_NONE_MATCH, "*")
                    .json(value),
            )
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT
            || status == reqwest::StatusCode::PRECONDITION_FAILED
        {
            return Err(DocStoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response, collection, id).await?;
        debug!(collection, id, "document created");
        Ok(())
    }

    /// Add a document with a store-generated ID.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError` on transport, permission, or parse failure.
    pub async fn add<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        value: &T,
    ) -> Result<DocumentId, DocStoreError> {
        let url = self.url_for(&[collection])?;
        let response = self.send(self.inner.client.post(url).json(value)).await?;
        let response = check_status(response, collection, "").await?;

        let created: CreatedResponse = parse_body(response).await?;
        debug!(collection, id = %created.id, "document added");
        Ok(DocumentId::new(created.id))
    }

    /// Delete a document.
    ///
    /// Deleting a document that does not exist is Ok; deletion is
    /// idempotent from the caller's point of view.
    ///
    /// # Errors
    ///
    /// Returns `DocStoreError` on transport or permission failure.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), DocStoreError> {
        let url = self.url_for(&[collection, id])?;
        let response = self.send(self.inner.client.delete(url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response, collection, id).await?;
        debug!(collection, id, "document deleted");
        Ok(())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Build a request URL from path segments under the base URL.
    fn url_for(&self, segments: &[&str]) -> Result<Url, DocStoreError> {
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DocStoreError::InvalidPath(
                "collection and document ID must be non-empty".to_string(),
            ));
        }

        let mut url = self.inner.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                DocStoreError::InvalidPath("base URL cannot be a base".to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Send a request with auth attached, triaging the failures every
    /// operation handles the same way (transport, permission, rate limit).
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, DocStoreError> {
        let response = request
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(DocStoreError::RateLimited(retry_after));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(DocStoreError::PermissionDenied(error_message(response).await));
        }

        Ok(response)
    }
}

/// Convert any remaining non-success status into `Api`.
async fn check_status(
    response: reqwest::Response,
    collection: &str,
    id: &str,
) -> Result<reqwest::Response, DocStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = error_message(response).await;
    tracing::error!(
        collection,
        id,
        status = status.as_u16(),
        message,
        "document store request failed"
    );
    Err(DocStoreError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Read a response body as JSON, keeping the raw text around for the error.
async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DocStoreError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse document store response"
        );
        DocStoreError::Parse(e)
    })
}

/// Extract a message from an error body, falling back to the raw text.
async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text).map_or_else(
        |_| text.chars().take(200).collect(),
        |body| body.error.message,
    )
}

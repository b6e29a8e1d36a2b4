//! Blob storage client.
//!
//! Upload, delete, and list binary blobs (profile pictures, listing
//! photos) at hierarchical paths like `profiles/{uid}/avatar.jpg`. The
//! backend is an external managed object store; retrieval URLs are plain
//! GETs against it. No chunking, no resumable uploads, no versioning.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::BlobStoreConfig;

/// Errors that can occur when talking to the object store.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Blob path cannot form a request URL.
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    /// Backend rejected the credentials.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other non-success response.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, truncated.
        message: String,
    },

    /// List response was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    paths: Vec<String>,
}

/// Client for the managed object store.
#[derive(Clone)]
pub struct BlobStoreClient {
    inner: Arc<BlobStoreClientInner>,
}

struct BlobStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl BlobStoreClient {
    /// Create a new object store client.
    #[must_use]
    pub fn new(config: &BlobStoreConfig) -> Self {
        Self {
            inner: Arc::new(BlobStoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
            }),
        }
    }

    /// Upload raw bytes to `path` and return the retrieval URL.
    ///
    /// # Errors
    ///
    /// Returns `BlobStoreError` on transport or permission failure.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Url, BlobStoreError> {
        let url = self.object_url(path)?;
        let size = bytes.len();

        let response = self
            .inner
            .client
            .put(url.clone())
            .bearer_auth(&self.inner.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        check_status(response).await?;
        debug!(path, size, content_type, "blob uploaded");
        Ok(url)
    }

    /// Upload a base64 payload to `path` and return the retrieval URL.
    ///
    /// Accepts bare base64 or a `data:<mime>;base64,` URI; an explicit
    /// `content_type` wins over the data-URI mime.
    ///
    /// # Errors
    ///
    /// Returns `BlobStoreError::Base64` for undecodable payloads, otherwise
    /// the same failures as [`Self::upload`].
    pub async fn upload_base64(
        &self,
        path: &str,
        data: &str,
        content_type: &str,
    ) -> Result<Url, BlobStoreError> {
        let encoded = data
            .split_once(";base64,")
            .map_or(data, |(_, payload)| payload);
        let bytes = BASE64.decode(encoded.trim())?;
        self.upload(path, bytes, content_type).await
    }

    /// Retrieval URL for a path. Builds locally; no network call.
    ///
    /// # Errors
    ///
    /// Returns `BlobStoreError::InvalidPath` for empty paths or a base URL
    /// that cannot take path segments.
    pub fn download_url(&self, path: &str) -> Result<Url, BlobStoreError> {
        self.object_url(path)
    }

    /// Delete the blob at `path`.
    ///
    /// Deleting a missing blob is Ok.
    ///
    /// # Errors
    ///
    /// Returns `BlobStoreError` on transport or permission failure.
    pub async fn delete(&self, path: &str) -> Result<(), BlobStoreError> {
        let url = self.object_url(path)?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response).await?;
        debug!(path, "blob deleted");
        Ok(())
    }

    /// List blob paths under a folder prefix.
    ///
    /// # Errors
    ///
    /// Returns `BlobStoreError` on transport, permission, or parse failure.
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobStoreError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                BlobStoreError::InvalidPath("base URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty().push("o");
        }
        url.query_pairs_mut().append_pair("prefix", prefix);

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(&self.inner.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;

        let text = response.text().await?;
        let listing: ListResponse = serde_json::from_str(&text)?;
        Ok(listing.paths)
    }

    /// URL of the object at `path` under the `o/` namespace.
    ///
    /// Path segments keep their hierarchy; each segment is percent-encoded
    /// individually.
    fn object_url(&self, path: &str) -> Result<Url, BlobStoreError> {
        if path.is_empty() || path.split('/').any(str::is_empty) {
            return Err(BlobStoreError::InvalidPath(format!(
                "blob path must be non-empty with no empty segments: {path:?}"
            )));
        }

        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                BlobStoreError::InvalidPath("base URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty().push("o");
            for segment in path.split('/') {
                segments.push(segment);
            }
        }
        Ok(url)
    }
}

/// Convert a non-success response into the matching error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BlobStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(BlobStoreError::PermissionDenied(message));
    }

    tracing::error!(status = status.as_u16(), message, "blob store request failed");
    Err(BlobStoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockito::Server;

    fn client(server: &Server) -> BlobStoreClient {
        BlobStoreClient::new(&crate::config::BlobStoreConfig {
            base_url: Url::parse(&server.url()).unwrap(),
            api_key: secrecy::SecretString::from("test-key"),
        })
    }

    #[tokio::test]
    async fn upload_puts_bytes_and_returns_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/o/profiles/uid-1/avatar.jpg")
            .match_header("content-type", "image/jpeg")
            .match_body(b"jpegbytes".to_vec())
            .with_status(200)
            .create_async()
            .await;

        let url = client(&server)
            .upload("profiles/uid-1/avatar.jpg", b"jpegbytes".to_vec(), "image/jpeg")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(url.as_str().ends_with("/o/profiles/uid-1/avatar.jpg"));
    }

    #[tokio::test]
    async fn upload_base64_strips_data_uri_header() {
        let mut server = Server::new_async().await;
        let encoded = BASE64.encode(b"pngbytes");
        let mock = server
            .mock("PUT", "/o/profiles/uid-1/avatar.png")
            .match_body(b"pngbytes".to_vec())
            .with_status(200)
            .create_async()
            .await;

        client(&server)
            .upload_base64(
                "profiles/uid-1/avatar.png",
                &format!("data:image/png;base64,{encoded}"),
                "image/png",
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_base64_rejects_garbage() {
        let server = Server::new_async().await;
        let err = client(&server)
            .upload_base64("p/a.png", "!!not-base64!!", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, BlobStoreError::Base64(_)));
    }

    #[test]
    fn download_url_is_local_and_hierarchical() {
        let url = Url::parse("https://media.example.com/v1").unwrap();
        let client = BlobStoreClient::new(&crate::config::BlobStoreConfig {
            base_url: url,
            api_key: secrecy::SecretString::from("k"),
        });

        let download = client.download_url("profiles/uid-1/avatar.jpg").unwrap();
        assert_eq!(
            download.as_str(),
            "https://media.example.com/v1/o/profiles/uid-1/avatar.jpg"
        );
    }

    #[test]
    fn empty_path_segment_is_rejected() {
        let client = BlobStoreClient::new(&crate::config::BlobStoreConfig {
            base_url: Url::parse("https://media.example.com/v1").unwrap(),
            api_key: secrecy::SecretString::from("k"),
        });
        assert!(matches!(
            client.download_url("profiles//avatar.jpg"),
            Err(BlobStoreError::InvalidPath(_))
        ));
        assert!(matches!(
            client.download_url(""),
            Err(BlobStoreError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn delete_missing_blob_is_ok() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/o/profiles/uid-1/avatar.jpg")
            .with_status(404)
            .create_async()
            .await;

        client(&server)
            .delete("profiles/uid-1/avatar.jpg")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_returns_paths_under_prefix() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/o?prefix=profiles%2Fuid-1")
            .with_status(200)
            .with_body(r#"{"paths": ["profiles/uid-1/avatar.jpg", "profiles/uid-1/visa.pdf"]}"#)
            .create_async()
            .await;

        let paths = client(&server).list("profiles/uid-1").await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&"profiles/uid-1/avatar.jpg".to_string()));
    }
}

//! Storage bucket client used to remove files orphaned by deleted records.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::StorageConfig;

/// Errors that can occur when talking to the storage API.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The file URL has no recognizable object path.
    #[error("Cannot derive object path from {0}")]
    InvalidUrl(String),

    #[error("Invalid service key: {0}")]
    InvalidKey(String),
}

/// Object path of a stored file: the last two segments of its public URL
/// (`<folder>/<file>`).
#[must_use]
pub fn object_path(file_url: &str) -> Option<String> {
    let url = Url::parse(file_url).ok()?;
    let mut segments = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .rev();
    let file = segments.next()?;
    let folder = segments.next()?;
    Some(format!("{folder}/{file}"))
}

/// Storage API client.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: Url,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let key = config.service_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| StorageError::InvalidKey(e.to_string()))?,
        );
        headers.insert(
            "apikey",
            HeaderValue::from_str(key).map_err(|e| StorageError::InvalidKey(e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: config.url.clone(),
                bucket: config.bucket.clone(),
            }),
        })
    }

    /// Delete the object behind `file_url` from the bucket.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the path cannot be derived or the API call fails.
    pub async fn remove(&self, file_url: &str) -> Result<(), StorageError> {
        let path =
            object_path(file_url).ok_or_else(|| StorageError::InvalidUrl(file_url.to_owned()))?;
        let endpoint = format!(
            "{}/object/{}",
            self.inner.base_url.as_str().trim_end_matches('/'),
            self.inner.bucket
        );

        let response = self
            .inner
            .client
            .delete(&endpoint)
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(%path, "Removed orphaned file");
            return Ok(());
        }

        Err(StorageError::Api {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }

    /// [`Self::remove`], logging failures instead of returning them.
    pub async fn remove_orphan(&self, file_url: &str) {
        if let Err(e) = self.remove(file_url).await {
            tracing::warn!(%file_url, error = %e, "Failed to remove orphaned file");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_uses_last_two_segments() {
        assert_eq!(
            object_path(
                "https://project.supabase.co/storage/v1/object/public/resources/notices/fee.pdf"
            )
            .as_deref(),
            Some("notices/fee.pdf")
        );
        assert_eq!(
            object_path("https://files.example.net/notices/fee.pdf/").as_deref(),
            Some("notices/fee.pdf")
        );
    }

    #[test]
    fn test_object_path_needs_two_segments() {
        assert_eq!(object_path("https://files.example.net/fee.pdf"), None);
        assert_eq!(object_path("not a url"), None);
    }
}

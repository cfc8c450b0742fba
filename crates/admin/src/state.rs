//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::storage::{StorageClient, StorageError};
use crate::services::uploads::{FileHostClient, UploadError};

/// Errors that can occur while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("file host client: {0}")]
    FileHost(#[from] UploadError),
    #[error("storage client: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    file_host: FileHostClient,
    storage: Option<StorageClient>,
}

impl AppState {
    /// Build the state and its HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if an HTTP client cannot be built.
    pub fn new(config: &AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let file_host = FileHostClient::new(config.file_host.clone())?;
        let storage = config.storage.as_ref().map(StorageClient::new).transpose()?;

        if storage.is_none() {
            tracing::info!("Storage bucket not configured; orphaned files will not be removed");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                file_host,
                storage,
            }),
        })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn file_host(&self) -> &FileHostClient {
        &self.inner.file_host
    }

    #[must_use]
    pub fn storage(&self) -> Option<&StorageClient> {
        self.inner.storage.as_ref()
    }
}

//! Object storage for uploaded images and documents.
//!
//! Rows only ever hold the URL returned by [`ObjectStore::upload`]; the
//! backend-specific public id needed for deletion is recovered from that URL.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::StorageConfig;

pub mod cloudinary;
pub mod local;
pub mod memory;

pub use cloudinary::CloudinaryStore;
pub use local::LocalObjectStore;
pub use memory::{MemoryObjectStore, StoreCall};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store rejected request: {0}")]
    Rejected(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` under `folder` and returns a retrievable URL.
    async fn upload(&self, data: Bytes, folder: &str) -> Result<String, StorageError>;

    /// Removes the object identified by `public_id`.
    async fn delete(&self, public_id: &str) -> Result<(), StorageError>;

    /// Recovers the public id of an object from the URL `upload` returned.
    fn public_id(&self, url: &str) -> Option<String>;

    /// Deletes the object behind `url`. URLs this store cannot interpret are
    /// skipped and an object that is already gone counts as deleted.
    async fn delete_url(&self, url: &str) -> Result<(), StorageError> {
        match self.public_id(url) {
            Some(public_id) => ignore_missing(url, self.delete(&public_id).await),
            None => {
                warn!(url, "Skipping blob delete for unrecognised URL");
                Ok(())
            }
        }
    }
}

/// Maps [`StorageError::NotFound`] to success.
pub(crate) fn ignore_missing(
    url: &str,
    result: Result<(), StorageError>,
) -> Result<(), StorageError> {
    match result {
        Err(StorageError::NotFound(public_id)) => {
            warn!(url, %public_id, "Blob already absent, treating as deleted");
            Ok(())
        }
        other => other,
    }
}

pub type SharedObjectStore = Arc<dyn ObjectStore>;

/// Builds the configured backend.
pub async fn from_config(cfg: &StorageConfig) -> Result<SharedObjectStore, StorageError> {
    match cfg.backend.to_ascii_lowercase().as_str() {
        "cloudinary" => {
            info!("Using Cloudinary object store");
            Ok(Arc::new(CloudinaryStore::from_config(cfg)?))
        }
        "local" => {
            info!(dir = %cfg.local_dir, "Using local filesystem object store");
            Ok(Arc::new(
                LocalObjectStore::new(&cfg.local_dir, &cfg.public_base_url).await?,
            ))
        }
        "memory" => {
            info!("Using in-memory object store");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
        other => Err(StorageError::Config(format!(
            "unknown storage backend '{}'",
            other
        ))),
    }
}

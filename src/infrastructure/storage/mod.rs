//! Media storage port and its backends.
//!
//! Paths are opaque keys such as `videoId-<uuid>/type-VIDEO`; listing works on key prefixes.

use crate::modules::video::media::Resource;
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod s3;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed for {path}: {reason}")]
    UploadFailed { path: String, reason: String },

    #[error("Download failed for {path}: {reason}")]
    DownloadFailed { path: String, reason: String },

    #[error("Delete failed for {path}: {reason}")]
    DeleteFailed { path: String, reason: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Writes the resource at `path`, replacing whatever was there.
    async fn store(&self, path: &str, resource: &Resource) -> StorageResult<()>;

    async fn get(&self, path: &str) -> StorageResult<Option<Resource>>;

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    async fn delete_all(&self, paths: &[String]) -> StorageResult<()>;
}

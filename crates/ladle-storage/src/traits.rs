use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during object-store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object-store boundary for the publishing pipeline.
///
/// A store writes opaque bytes under caller-chosen keys with no
/// pre-registration and returns a publicly addressable URL for each written
/// object. A returned URL is assumed readable immediately after a successful
/// put.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key` and return the object's public URL.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String>;

    /// Report whether an object exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}

#[cfg(feature = "storage-local")]
use crate::LocalObjectStore;
#[cfg(feature = "storage-s3")]
use crate::S3ObjectStore;
use crate::{ObjectStore, StorageError, StorageResult};
use ladle_core::{PublisherConfig, StorageBackend};
use std::sync::Arc;

/// Create an object store based on configuration
pub async fn create_object_store(
    config: &PublisherConfig,
) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_REGION not configured".to_string()))?;
            let endpoint = config.s3_endpoint_url.clone();

            let store = S3ObjectStore::new(bucket, region, endpoint).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let store = LocalObjectStore::new(
                config.local_storage_path.clone(),
                config.local_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

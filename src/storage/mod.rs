//! Blob persistence for fetched weather artifacts.

mod error;
mod memory;
mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use error::StorageError;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

/// Listing metadata for one stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// Storage operations the gateway needs from a blob backend.
///
/// Handlers only see this trait; the backend is chosen once at startup.
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns whether the configured bucket exists.
    async fn bucket_exists(&self) -> Result<bool, StorageError>;

    /// Creates the configured bucket.
    async fn create_bucket(&self) -> Result<(), StorageError>;

    /// Writes an object, replacing any previous content under `key`.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Returns whether an object exists under `key`.
    async fn object_exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Reads an object's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when no object exists under `key`.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Lists every object in the bucket, ordered by key.
    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StorageError>;

    /// Creates the configured bucket if it does not exist yet.
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if !self.bucket_exists().await? {
            self.create_bucket().await?;
        }
        Ok(())
    }
}

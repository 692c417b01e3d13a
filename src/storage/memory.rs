use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use tokio::sync::Mutex;

use crate::storage::{BlobStore, ObjectSummary, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    bucket_created: bool,
    objects: BTreeMap<String, StoredObject>,
}

/// In-memory [`BlobStore`] holding objects in a key-ordered map.
///
/// Selected with `STORAGE_BACKEND=memory`. Contents live as long as the
/// process; there is no persistence. Also serves as the storage double in
/// the HTTP tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    state: Mutex<MemoryState>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded for `key`, if the object exists.
    #[cfg(test)]
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let state = self.state.lock().await;
        state
            .objects
            .get(key)
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        Ok(self.state.lock().await.bucket_created)
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        self.state.lock().await.bucket_created = true;
        debug!("Created in-memory bucket");
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut state = self.state.lock().await;
        match state.objects.get_mut(key) {
            Some(object) => {
                object.bytes = bytes;
                object.content_type = content_type.to_owned();
                object.updated = now;
            }
            None => {
                state.objects.insert(
                    key.to_owned(),
                    StoredObject {
                        bytes,
                        content_type: content_type.to_owned(),
                        created: now,
                        updated: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.state.lock().await.objects.contains_key(key))
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let state = self.state.lock().await;
        state
            .objects
            .get(key)
            .map(|object| object.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))
    }

    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StorageError> {
        let state = self.state.lock().await;
        Ok(state
            .objects
            .iter()
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.bytes.len() as i64,
                created: Some(object.created),
                updated: Some(object.updated),
            })
            .collect())
    }
}

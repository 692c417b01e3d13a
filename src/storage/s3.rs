use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use log::info;

use crate::storage::{BlobStore, ObjectSummary, StorageError};

/// Blob storage backed by an S3-compatible service.
///
/// Holds one bucket name for its whole lifetime; the gateway never touches
/// more than one bucket.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Builds a store from the ambient AWS environment (credentials, region
    /// and an optional `AWS_ENDPOINT_URL` override).
    ///
    /// `force_path_style` addresses buckets as path segments instead of
    /// virtual-host subdomains, which servers such as MinIO require.
    pub async fn from_env(bucket: impl Into<String>, force_path_style: bool) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let conf = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(force_path_style)
            .build();
        Self {
            client: Client::from_conf(conf),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => match aws_sdk_s3::Error::from(err) {
                aws_sdk_s3::Error::NotFound(_) => Ok(false),
                err => Err(StorageError::BucketCheck(self.bucket.clone(), err)),
            },
        }
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|err| StorageError::BucketCreate(self.bucket.clone(), err.into()))?;
        info!("Created bucket '{}'", self.bucket);
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| StorageError::Write(key.to_owned(), err.into()))?;
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => match aws_sdk_s3::Error::from(err) {
                aws_sdk_s3::Error::NotFound(_) => Ok(false),
                err => Err(StorageError::Head(key.to_owned(), err)),
            },
        }
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                return Err(match aws_sdk_s3::Error::from(err) {
                    aws_sdk_s3::Error::NoSuchKey(_) => StorageError::NotFound(key.to_owned()),
                    err => StorageError::Read(key.to_owned(), err),
                });
            }
        };
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::ReadBody(key.to_owned(), err))?;
        Ok(bytes.into_bytes().to_vec())
    }

    async fn list_objects(&self) -> Result<Vec<ObjectSummary>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        let mut summaries = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| StorageError::List(self.bucket.clone(), err.into()))?;
            for object in page.contents() {
                // objects are written once, so LastModified doubles as creation time
                let updated = object.last_modified().and_then(to_chrono);
                summaries.push(ObjectSummary {
                    key: object.key().unwrap_or_default().to_owned(),
                    size: object.size().unwrap_or_default(),
                    created: updated,
                    updated,
                });
            }
        }
        // pages arrive key-ordered from S3 itself, but the trait promises it
        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(summaries)
    }
}

fn to_chrono(timestamp: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

use thiserror::Error;

/// Errors raised by the blob storage backends.
///
/// Every variant carries the bucket or key it concerns; only
/// [`StorageError::NotFound`] is distinguished by the HTTP layer, the rest
/// collapse to generic 500 messages.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object '{0}' not found")]
    NotFound(String),

    #[error("Failed to check whether bucket '{0}' exists")]
    BucketCheck(String, #[source] aws_sdk_s3::Error),

    #[error("Failed to create bucket '{0}'")]
    BucketCreate(String, #[source] aws_sdk_s3::Error),

    #[error("Failed to write object '{0}'")]
    Write(String, #[source] aws_sdk_s3::Error),

    #[error("Failed to check whether object '{0}' exists")]
    Head(String, #[source] aws_sdk_s3::Error),

    #[error("Failed to read object '{0}'")]
    Read(String, #[source] aws_sdk_s3::Error),

    #[error("Failed to read the body of object '{0}'")]
    ReadBody(String, #[source] aws_sdk_s3::primitives::ByteStreamError),

    #[error("Failed to list objects in bucket '{0}'")]
    List(String, #[source] aws_sdk_s3::Error),
}

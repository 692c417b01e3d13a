//! Environment-based service configuration, read once at startup.

use std::env;

use thiserror::Error;

/// Bucket used when `WEATHER_BUCKET_NAME` is not set.
pub const DEFAULT_BUCKET: &str = "weather-data-bucket";
/// Listen port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8000;

const ENV_BUCKET: &str = "WEATHER_BUCKET_NAME";
const ENV_PORT: &str = "PORT";
const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";
const ENV_FORCE_PATH_STYLE: &str = "S3_FORCE_PATH_STYLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{1}' for {0}: expected a port number")]
    InvalidPort(&'static str, String, #[source] std::num::ParseIntError),

    #[error("Invalid value '{1}' for {0}: expected 's3' or 'memory'")]
    UnknownStorageBackend(&'static str, String),
}

/// Which blob-store implementation the process runs against.
///
/// Chosen once at startup and never switched afterwards, so the in-memory
/// double cannot activate by accident in a live deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Live S3-compatible object storage.
    S3,
    /// In-process [`crate::MemoryBlobStore`] double.
    Memory,
}

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket holding the stored weather artifacts.
    pub bucket: String,
    /// TCP port the HTTP surface listens on.
    pub port: u16,
    /// Storage implementation selected for this process.
    pub storage_backend: StorageBackend,
    /// Use path-style S3 addressing (needed for MinIO-style endpoints).
    pub s3_force_path_style: bool,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Unset variables fall back to defaults; set-but-invalid values are
    /// startup errors rather than silent fallbacks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] when `PORT` is not a valid port
    /// number and [`ConfigError::UnknownStorageBackend`] when
    /// `STORAGE_BACKEND` is neither `s3` nor `memory`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bucket = get(ENV_BUCKET)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        let port = match get(ENV_PORT) {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidPort(ENV_PORT, raw, e))?,
            None => DEFAULT_PORT,
        };

        let storage_backend = match get(ENV_STORAGE_BACKEND)
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("s3") => StorageBackend::S3,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::UnknownStorageBackend(
                    ENV_STORAGE_BACKEND,
                    other.to_string(),
                ))
            }
        };

        let s3_force_path_style = matches!(
            get(ENV_FORCE_PATH_STYLE)
                .map(|value| value.to_ascii_lowercase())
                .as_deref(),
            Some("true") | Some("1")
        );

        Ok(Self {
            bucket,
            port,
            storage_backend,
            s3_force_path_style,
        })
    }
}

mod config;
mod error;
mod http;
mod openmeteo;
mod query;
mod storage;

pub use config::{Config, ConfigError, StorageBackend};
pub use error::{ErrorBody, GatewayError};
pub use http::{
    router, AppState, DateRange, FileContentResponse, FileEntry, FileListing, HealthResponse,
    Location, StoreWeatherResponse,
};
pub use openmeteo::{OpenMeteoClient, WeatherFetchError, ARCHIVE_BASE_URL, DAILY_METRICS};
pub use query::{ValidationError, WeatherQuery};
pub use storage::{BlobStore, MemoryBlobStore, ObjectSummary, S3BlobStore, StorageError};

/// Service identifier reported by the health endpoint.
pub const SERVICE_NAME: &str = "weather-archive-gateway";

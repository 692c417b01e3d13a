use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while fetching from the archive API.
#[derive(Debug, Error)]
pub enum WeatherFetchError {
    #[error("Failed to construct the archive HTTP client")]
    BuildClient(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    Request(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    Status {
        url: String,
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response body from {0}")]
    Decode(String, #[source] reqwest::Error),
}

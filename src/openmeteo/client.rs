use std::time::Duration;

use bon::bon;
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::openmeteo::WeatherFetchError;
use crate::query::{WeatherQuery, DATE_FORMAT};

/// Endpoint of the Open-Meteo historical archive API.
pub const ARCHIVE_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Daily aggregates requested for every query, each sent as its own
/// `daily` query parameter.
pub const DAILY_METRICS: [&str; 6] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "apparent_temperature_mean",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Open-Meteo historical archive API.
///
/// Wraps a pooled [`reqwest::Client`]; cloning is cheap and clones share
/// the underlying connection pool.
///
/// # Examples
///
/// ```rust
/// # use weather_archive_gateway::{OpenMeteoClient, WeatherFetchError};
/// # fn run() -> Result<(), WeatherFetchError> {
/// let client = OpenMeteoClient::builder().build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
}

#[bon]
impl OpenMeteoClient {
    /// Creates a new archive client.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.base_url(String)`: Optional. Defaults to [`ARCHIVE_BASE_URL`].
    /// * `.timeout(Duration)`: Optional. Per-request timeout. Defaults to 30 seconds.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherFetchError::BuildClient`] if the underlying HTTP
    /// client cannot be constructed.
    #[builder]
    pub fn new(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self, WeatherFetchError> {
        let http = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .map_err(WeatherFetchError::BuildClient)?;
        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| ARCHIVE_BASE_URL.to_owned()),
        })
    }
}

impl OpenMeteoClient {
    /// Fetches the daily archive document for a validated query.
    ///
    /// Sends the coordinate, the inclusive date range and one `daily`
    /// parameter per metric in [`DAILY_METRICS`], and returns the response
    /// body as untyped JSON. The document is passed through unmodified, so
    /// upstream schema additions survive storage.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherFetchError::Request`] when the request cannot be
    /// sent or times out, [`WeatherFetchError::Status`] when the archive
    /// responds with a non-success status, and
    /// [`WeatherFetchError::Decode`] when the body is not valid JSON.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use weather_archive_gateway::{GatewayError, OpenMeteoClient, WeatherQuery};
    /// # async fn run() -> Result<(), GatewayError> {
    /// let client = OpenMeteoClient::builder().build()?;
    /// let query = WeatherQuery::from_request_body(&serde_json::json!({
    ///     "latitude": 52.52,
    ///     "longitude": 13.41,
    ///     "start_date": "2023-01-01",
    ///     "end_date": "2023-01-07",
    /// }))?;
    /// let document = client.fetch_daily(&query).await?;
    /// println!("{document}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_daily(&self, query: &WeatherQuery) -> Result<Value, WeatherFetchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("latitude", query.latitude.to_string()),
            ("longitude", query.longitude.to_string()),
            ("start_date", query.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", query.end_date.format(DATE_FORMAT).to_string()),
        ];
        params.extend(DAILY_METRICS.iter().map(|metric| ("daily", (*metric).to_owned())));

        info!(
            "Fetching daily archive data for ({}, {}) from {} to {}",
            query.latitude, query.longitude, query.start_date, query.end_date
        );

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| WeatherFetchError::Request(self.base_url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                warn!("Archive request to {} failed: {}", self.base_url, e);
                return Err(if let Some(status) = e.status() {
                    WeatherFetchError::Status {
                        url: self.base_url.clone(),
                        status,
                        source: e,
                    }
                } else {
                    WeatherFetchError::Request(self.base_url.clone(), e)
                });
            }
        };

        response
            .json::<Value>()
            .await
            .map_err(|e| WeatherFetchError::Decode(self.base_url.clone(), e))
    }
}

//! Store-request validation and the object-key naming policy.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const REQUIRED_FIELDS: [&str; 4] = ["latitude", "longitude", "start_date", "end_date"];

/// A store request rejected before any external call is made.
///
/// Each variant's display string is exactly the message returned to the
/// caller in the error envelope.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Request must be JSON")]
    NotJson,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid latitude or longitude values")]
    InvalidCoordinates,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat,

    #[error("start_date must be before or equal to end_date")]
    InvertedDateRange,
}

/// A validated store request: a coordinate plus an inclusive date range.
///
/// Constructed from the incoming request body via
/// [`WeatherQuery::from_request_body`]; used to derive both the outbound
/// archive query and the storage key. Never persisted itself.
///
/// # Examples
///
/// ```
/// use weather_archive_gateway::WeatherQuery;
///
/// let body = serde_json::json!({
///     "latitude": 52.52,
///     "longitude": 13.41,
///     "start_date": "2023-01-01",
///     "end_date": "2023-01-07"
/// });
/// let query = WeatherQuery::from_request_body(&body)?;
/// assert_eq!(query.latitude, 52.52);
/// # Ok::<(), weather_archive_gateway::ValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeatherQuery {
    /// Validates a parsed JSON request body into a `WeatherQuery`.
    ///
    /// Checks run in a fixed order and short-circuit on the first failure:
    /// field presence (in declaration order), coordinate type and range,
    /// strict `YYYY-MM-DD` date format, then date ordering. A non-object
    /// body behaves like an object with no fields and fails the first
    /// presence check.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] naming the first failed check.
    pub fn from_request_body(body: &Value) -> Result<Self, ValidationError> {
        for field in REQUIRED_FIELDS {
            if body.get(field).is_none() {
                return Err(ValidationError::MissingField(field));
            }
        }

        let latitude = number_field(body, "latitude")?;
        let longitude = number_field(body, "longitude")?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::InvalidCoordinates);
        }

        let start_date = date_field(body, "start_date")?;
        let end_date = date_field(body, "end_date")?;
        if start_date > end_date {
            return Err(ValidationError::InvertedDateRange);
        }

        Ok(Self {
            latitude,
            longitude,
            start_date,
            end_date,
        })
    }

    /// Derives the storage key for an artifact stored at `stored_at`:
    /// `weather_data_lat<lat>_lon<lon>_<start>_to_<end>_<YYYYMMDD_HHMMSS>.json`.
    ///
    /// The timestamp is second-resolution, so two identical queries stored
    /// within the same second produce the same key (an accepted limitation;
    /// callers retrieve artifacts via the returned key, never by
    /// reconstructing it).
    pub fn object_key(&self, stored_at: DateTime<Utc>) -> String {
        format!(
            "weather_data_lat{}_lon{}_{}_to_{}_{}.json",
            self.latitude,
            self.longitude,
            self.start_date.format(DATE_FORMAT),
            self.end_date.format(DATE_FORMAT),
            stored_at.format(KEY_TIMESTAMP_FORMAT),
        )
    }
}

fn number_field(body: &Value, field: &str) -> Result<f64, ValidationError> {
    body.get(field)
        .and_then(Value::as_f64)
        .ok_or(ValidationError::InvalidCoordinates)
}

fn date_field(body: &Value, field: &str) -> Result<NaiveDate, ValidationError> {
    body.get(field)
        .and_then(Value::as_str)
        .and_then(parse_strict_date)
        .ok_or(ValidationError::InvalidDateFormat)
}

/// Parses `YYYY-MM-DD`, rejecting anything that is not the canonical
/// zero-padded form.
fn parse_strict_date(raw: &str) -> Option<NaiveDate> {
    // %Y parses signed years ("-0001", "+10000") and reformats them
    // verbatim; the fixed width rules them out before the round trip
    if raw.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()?;
    // parse_from_str accepts unpadded numerals; only the fixed-width form
    // keeps lexicographic and chronological ordering identical
    (date.format(DATE_FORMAT).to_string() == raw).then_some(date)
}

//! Client for the Open-Meteo historical archive API.

mod client;
mod error;

pub use client::{OpenMeteoClient, ARCHIVE_BASE_URL, DAILY_METRICS};
pub use error::WeatherFetchError;

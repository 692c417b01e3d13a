use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::http::AppState;
use crate::query::{ValidationError, WeatherQuery};
use crate::storage::{ObjectSummary, StorageError};
use crate::SERVICE_NAME;

/// Body of a successful store response: a confirmation plus an echo of the
/// validated request and the key the artifact was stored under.
#[derive(Debug, Serialize)]
pub struct StoreWeatherResponse {
    pub message: &'static str,
    pub filename: String,
    pub location: Location,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Body of the listing response.
#[derive(Debug, Serialize)]
pub struct FileListing {
    pub files: Vec<FileEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub filename: String,
    pub size: i64,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl From<ObjectSummary> for FileEntry {
    fn from(summary: ObjectSummary) -> Self {
        Self {
            filename: summary.key,
            size: summary.size,
            created: summary.created,
            updated: summary.updated,
        }
    }
}

/// Body of the content response: the artifact parsed back into JSON.
#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub filename: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
}

/// Validates the request, fetches the archive document and persists it
/// pretty-printed under a freshly derived key.
pub(super) async fn store_weather_data(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreWeatherResponse>), GatewayError> {
    let Json(body) = payload.map_err(|_| ValidationError::NotJson)?;
    let query = WeatherQuery::from_request_body(&body)?;

    let document = state.weather.fetch_daily(&query).await?;

    let filename = query.object_key(Utc::now());
    let bytes = serde_json::to_vec_pretty(&document)
        .map_err(|err| GatewayError::SerializeArtifact(filename.clone(), err))?;
    state
        .store
        .put_object(&filename, bytes, "application/json")
        .await?;
    info!("Successfully stored weather data: {filename}");

    Ok((
        StatusCode::CREATED,
        Json(StoreWeatherResponse {
            message: "Weather data stored successfully",
            filename,
            location: Location {
                latitude: query.latitude,
                longitude: query.longitude,
            },
            date_range: DateRange {
                start_date: query.start_date,
                end_date: query.end_date,
            },
        }),
    ))
}

pub(super) async fn list_weather_files(
    State(state): State<AppState>,
) -> Result<Json<FileListing>, GatewayError> {
    let files: Vec<FileEntry> = state
        .store
        .list_objects()
        .await?
        .into_iter()
        .map(FileEntry::from)
        .collect();
    Ok(Json(FileListing {
        count: files.len(),
        files,
    }))
}

/// Returns a stored artifact parsed back into JSON.
///
/// The existence check runs first so a missing key is reported as 404
/// rather than as a failed read.
pub(super) async fn weather_file_content(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<FileContentResponse>, GatewayError> {
    if !state.store.object_exists(&filename).await? {
        return Err(StorageError::NotFound(filename).into());
    }
    let bytes = state.store.get_object(&filename).await?;
    let data: Value = serde_json::from_slice(&bytes)
        .map_err(|err| GatewayError::CorruptArtifact(filename.clone(), err))?;
    Ok(Json(FileContentResponse { filename, data }))
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        service: SERVICE_NAME,
    })
}

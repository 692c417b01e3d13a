use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::openmeteo::WeatherFetchError;
use crate::query::ValidationError;
use crate::storage::StorageError;

/// Top-level error for every gateway operation.
///
/// Module errors are aggregated transparently; the HTTP status and the
/// message exposed to callers are derived from the variant alone, so a
/// handler never picks a status itself.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] WeatherFetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Stored object '{0}' does not contain valid JSON")]
    CorruptArtifact(String, #[source] serde_json::Error),

    #[error("Failed to serialize the artifact for '{0}'")]
    SerializeArtifact(String, #[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind to {0}")]
    Bind(SocketAddr, #[source] std::io::Error),

    #[error("Server terminated abnormally")]
    Serve(#[source] std::io::Error),
}

impl GatewayError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Fetch(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(_)
            | Self::CorruptArtifact(..)
            | Self::SerializeArtifact(..)
            | Self::Config(_)
            | Self::Bind(..)
            | Self::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the error envelope.
    ///
    /// Validation messages are shown verbatim; everything else collapses to
    /// a fixed phrase so internal detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Fetch(_) => "Failed to fetch weather data from Open-Meteo API".to_owned(),
            Self::Storage(err) => storage_message(err).to_owned(),
            Self::CorruptArtifact(..) => "Invalid JSON file".to_owned(),
            Self::SerializeArtifact(..) | Self::Config(_) | Self::Bind(..) | Self::Serve(_) => {
                "Internal server error".to_owned()
            }
        }
    }
}

fn storage_message(err: &StorageError) -> &'static str {
    match err {
        StorageError::NotFound(_) => "File not found",
        StorageError::List(..) => "Failed to list files",
        StorageError::Head(..) | StorageError::Read(..) | StorageError::ReadBody(..) => {
            "Failed to retrieve file content"
        }
        StorageError::BucketCheck(..) | StorageError::BucketCreate(..) | StorageError::Write(..) => {
            "Internal server error"
        }
    }
}

/// The JSON envelope used for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{status}: {self:?}");
        } else {
            warn!("{status}: {self}");
        }
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

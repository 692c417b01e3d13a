//! HTTP surface: routing, shared state and the request handlers.

mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::ErrorBody;
use crate::openmeteo::OpenMeteoClient;
use crate::storage::BlobStore;

pub use handlers::{
    DateRange, FileContentResponse, FileEntry, FileListing, HealthResponse, Location,
    StoreWeatherResponse,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub weather: OpenMeteoClient,
    pub store: Arc<dyn BlobStore>,
}

/// Builds the gateway router: the four endpoints plus JSON fallbacks for
/// unknown paths and wrong methods.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/store-weather-data", post(handlers::store_weather_data))
        .route("/list-weather-files", get(handlers::list_weather_files))
        .route(
            "/weather-file-content/{filename}",
            get(handlers::weather_file_content),
        )
        .route("/health", get(handlers::health))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(endpoint_not_found)
        .with_state(state)
}

async fn endpoint_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Endpoint not found")),
    )
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed")),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::MemoryBlobStore;
    use crate::{OpenMeteoClient, SERVICE_NAME};

    fn sample_archive_document() -> Value {
        json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "timezone": "GMT",
            "daily_units": {"time": "iso8601", "temperature_2m_max": "°C"},
            "daily": {
                "time": ["2023-01-01", "2023-01-02"],
                "temperature_2m_max": [15.3, 14.9],
                "temperature_2m_min": [7.0, 7.9],
                "temperature_2m_mean": [11.1, 11.2],
                "apparent_temperature_max": [13.2, 12.8],
                "apparent_temperature_min": [4.9, 5.6],
                "apparent_temperature_mean": [9.4, 9.6]
            }
        })
    }

    async fn archive_server(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn gateway(archive_url: String) -> (Router, Arc<MemoryBlobStore>) {
        let store = Arc::new(MemoryBlobStore::new());
        let weather = OpenMeteoClient::builder()
            .base_url(archive_url)
            .build()
            .unwrap();
        let app = router(AppState {
            weather,
            store: store.clone(),
        });
        (app, store)
    }

    fn offline_gateway() -> (Router, Arc<MemoryBlobStore>) {
        // port 9 refuses connections, so an unexpected fetch fails fast
        gateway("http://127.0.0.1:9".to_owned())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn store_request(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/store-weather-data")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn valid_store_body() -> Value {
        json!({
            "latitude": 52.52,
            "longitude": 13.41,
            "start_date": "2023-01-01",
            "end_date": "2023-01-07"
        })
    }

    #[tokio::test]
    async fn test_store_weather_data_persists_and_echoes_the_request() {
        let document = sample_archive_document();
        let server =
            archive_server(ResponseTemplate::new(200).set_body_json(document.clone())).await;
        let (app, store) = gateway(server.uri());

        let (status, body) = send(app, store_request(&valid_store_body())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Weather data stored successfully");
        assert_eq!(
            body["location"],
            json!({"latitude": 52.52, "longitude": 13.41})
        );
        assert_eq!(
            body["date_range"],
            json!({"start_date": "2023-01-01", "end_date": "2023-01-07"})
        );

        let filename = body["filename"].as_str().unwrap();
        assert!(
            filename.starts_with("weather_data_lat52.52_lon13.41_2023-01-01_to_2023-01-07_"),
            "unexpected filename '{filename}'"
        );
        assert!(filename.ends_with(".json"));

        let stored = store.get_object(filename).await.unwrap();
        let text = String::from_utf8(stored).unwrap();
        assert!(text.starts_with("{\n  \""), "artifact is not pretty-printed");
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), document);
        assert_eq!(
            store.content_type(filename).await.as_deref(),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_store_weather_data_rejects_a_non_json_body() {
        let (app, store) = offline_gateway();

        let request = Request::builder()
            .method("POST")
            .uri("/store-weather-data")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("latitude=52.52"))
            .unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Request must be JSON");
        assert!(store.list_objects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_weather_data_names_the_missing_field() {
        let (app, _store) = offline_gateway();

        let mut body = valid_store_body();
        body.as_object_mut().unwrap().remove("start_date");
        let (status, body) = send(app, store_request(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: start_date");
    }

    #[tokio::test]
    async fn test_store_weather_data_rejects_bad_coordinates() {
        let (app, _store) = offline_gateway();

        let mut body = valid_store_body();
        body["latitude"] = json!(91.0);
        let (status, body) = send(app, store_request(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid latitude or longitude values");
    }

    #[tokio::test]
    async fn test_store_weather_data_rejects_malformed_dates() {
        let (app, _store) = offline_gateway();

        let mut body = valid_store_body();
        body["start_date"] = json!("01-01-2023");
        let (status, body) = send(app, store_request(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid date format. Use YYYY-MM-DD");
    }

    #[tokio::test]
    async fn test_store_weather_data_rejects_an_inverted_range() {
        let (app, _store) = offline_gateway();

        let mut body = valid_store_body();
        body["start_date"] = json!("2023-02-01");
        body["end_date"] = json!("2023-01-01");
        let (status, body) = send(app, store_request(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "start_date must be before or equal to end_date");
    }

    #[tokio::test]
    async fn test_store_weather_data_maps_upstream_failures_to_bad_gateway() {
        let server = archive_server(ResponseTemplate::new(500)).await;
        let (app, store) = gateway(server.uri());

        let (status, body) = send(app, store_request(&valid_store_body())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to fetch weather data from Open-Meteo API");
        assert!(store.list_objects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_weather_data_maps_an_unreachable_upstream_to_bad_gateway() {
        let (app, store) = offline_gateway();

        let (status, body) = send(app, store_request(&valid_store_body())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to fetch weather data from Open-Meteo API");
        assert!(store.list_objects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_distinct_queries_store_under_distinct_filenames() {
        let server = archive_server(ResponseTemplate::new(200).set_body_json(json!({}))).await;
        let (app, store) = gateway(server.uri());

        let (_, first) = send(app.clone(), store_request(&valid_store_body())).await;
        let mut other = valid_store_body();
        other["latitude"] = json!(48.85);
        let (_, second) = send(app, store_request(&other)).await;

        assert_ne!(first["filename"], second["filename"]);
        assert_eq!(store.list_objects().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_weather_file_content_round_trips_a_stored_artifact() {
        let document = sample_archive_document();
        let server =
            archive_server(ResponseTemplate::new(200).set_body_json(document.clone())).await;
        let (app, _store) = gateway(server.uri());

        let (_, stored) = send(app.clone(), store_request(&valid_store_body())).await;
        let filename = stored["filename"].as_str().unwrap();

        let (status, body) =
            send(app, get_request(&format!("/weather-file-content/{filename}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filename"], *filename);
        assert_eq!(body["data"], document);
    }

    #[tokio::test]
    async fn test_weather_file_content_returns_not_found_for_unknown_files() {
        let (app, _store) = offline_gateway();

        let (status, body) = send(app, get_request("/weather-file-content/nope.json")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "File not found");
    }

    #[tokio::test]
    async fn test_weather_file_content_flags_corrupt_artifacts() {
        let (app, store) = offline_gateway();
        store
            .put_object("broken.json", b"not json".to_vec(), "application/json")
            .await
            .unwrap();

        let (status, body) = send(app, get_request("/weather-file-content/broken.json")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Invalid JSON file");
    }

    #[tokio::test]
    async fn test_list_weather_files_reports_an_empty_bucket() {
        let (app, _store) = offline_gateway();

        let (status, body) = send(app, get_request("/list-weather-files")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"files": [], "count": 0}));
    }

    #[tokio::test]
    async fn test_list_weather_files_returns_every_stored_artifact() {
        let (app, store) = offline_gateway();
        store
            .put_object("a.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        store
            .put_object("b.json", b"[1]".to_vec(), "application/json")
            .await
            .unwrap();

        let (status, body) = send(app, get_request("/list-weather-files")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        let files = body["files"].as_array().unwrap();
        assert_eq!(files[0]["filename"], "a.json");
        assert_eq!(files[0]["size"], 2);
        assert!(files[0]["created"].is_string());
        assert!(files[0]["updated"].is_string());
        assert_eq!(files[1]["filename"], "b.json");
    }

    #[tokio::test]
    async fn test_health_reports_the_service_and_a_parseable_timestamp() {
        let (app, _store) = offline_gateway();

        let (status, body) = send(app, get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], SERVICE_NAME);
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(
            timestamp.parse::<DateTime<Utc>>().is_ok(),
            "unparseable timestamp '{timestamp}'"
        );
    }

    #[tokio::test]
    async fn test_unknown_routes_get_the_json_not_found_envelope() {
        let (app, _store) = offline_gateway();

        let (status, body) = send(app, get_request("/no-such-endpoint")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_wrong_methods_get_the_json_method_not_allowed_envelope() {
        let (app, _store) = offline_gateway();

        let (status, body) = send(app, get_request("/store-weather-data")).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }
}

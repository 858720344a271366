//! HTTP client against a mock weather service

use meteo::api::{ApiError, WeatherClient};
use meteo::state::{CitySearchResult, WeatherSnapshot};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> WeatherClient {
    WeatherClient::new(server.uri().parse().unwrap()).unwrap()
}

#[tokio::test]
async fn fetch_weather_parses_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moscow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "moscow",
            "temperature": 5,
            "timestamp": "2024-01-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client(&server).fetch_weather("moscow").await.unwrap();

    assert_eq!(
        snapshot,
        WeatherSnapshot {
            name: "moscow".into(),
            temperature: 5.0,
            timestamp: "2024-01-01T12:00:00Z".into(),
        }
    );
}

#[tokio::test]
async fn fetch_weather_encodes_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/new%20york"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "new york",
            "temperature": -2.5,
            "timestamp": "2024-01-01T07:00:00-05:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client(&server).fetch_weather("new york").await.unwrap();
    assert_eq!(snapshot.temperature, -2.5);
}

#[tokio::test]
async fn unknown_city_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unknuwn"))
        .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).fetch_weather("unknuwn").await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound { ref city } if city == "unknuwn"));
    assert_eq!(err.to_string(), "no data found for \"unknuwn\"");
}

#[tokio::test]
async fn server_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/paris"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).fetch_weather("paris").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE
        }
    ));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rome"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_weather("rome").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Nothing listens on port 1.
    let client = WeatherClient::new("http://127.0.0.1:1".parse().unwrap()).unwrap();
    let err = client.fetch_weather("moscow").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn search_cities_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities/search"))
        .and(query_param("q", "ber"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Berlin", "country": "DE", "latitude": 52.52, "longitude": 13.405},
            {"name": "Bern", "country": "CH", "latitude": 46.948, "longitude": 7.447}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server).search_cities("ber").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0],
        CitySearchResult {
            name: "Berlin".into(),
            country: "DE".into(),
            latitude: 52.52,
            longitude: 13.405,
        }
    );
    assert_eq!(results[1].city_key(), "bern");
}

#[tokio::test]
async fn search_cities_failure_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).search_cities("zz").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }));
}

mod common;

use std::sync::atomic::Ordering;

use airwatch::models::QualityLevel;
use airwatch::{AirQualityBackend, AirWatchError, PredictionRequest, RemoteClient};
use chrono::NaiveDate;
use common::{FakeServer, unreachable_backend};

#[tokio::test]
async fn test_health_check() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let health = client.check_health().await.unwrap();
    assert!(health.is_healthy());
    assert!(health.model_loaded);
    assert_eq!(health.device.as_deref(), Some("cpu"));

    server.state.healthy.store(false, Ordering::SeqCst);
    let err = client.check_health().await.unwrap_err();
    assert!(matches!(err, AirWatchError::Network { status: Some(503), .. }));
}

#[tokio::test]
async fn test_list_cities() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let cities = client.list_cities().await.unwrap();
    assert_eq!(cities.len(), 3);
    assert_eq!(cities[1].name, "Mendoza");
    assert_eq!(cities[1].country.as_deref(), Some("Argentina"));
}

#[tokio::test]
async fn test_fetch_city_data_with_encoded_name() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let bundle = client.fetch_city_data("São Paulo").await.unwrap();
    assert_eq!(bundle.current.pm25, 41.7);
    // backend says "BUENA", the level is derived from pm25
    assert_eq!(bundle.current.quality_level, QualityLevel::UnhealthySensitive);
    assert_eq!(bundle.current.temperature, 17.0);
    assert_eq!(
        bundle.prediction.prediction_date,
        NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
    );
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let err = client.fetch_city_data("Lima").await.unwrap_err();
    assert!(matches!(err, AirWatchError::NotFound { ref city } if city == "Lima"));
}

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let err = client.fetch_city_data("Mendoza").await.unwrap_err();
    assert!(matches!(err, AirWatchError::Network { status: Some(500), .. }));
    assert!(err.to_string().contains("sensor offline"));
}

#[tokio::test]
async fn test_confidence_out_of_range_is_rejected() {
    let server = FakeServer::start().await;
    server.state.bad_confidence.store(true, Ordering::SeqCst);
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let err = client.fetch_city_data("Madrid").await.unwrap_err();
    assert!(matches!(err, AirWatchError::Validation { .. }));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = FakeServer::start().await;
    server.state.slow_seconds.store(3, Ordering::SeqCst);
    let client = RemoteClient::new(&server.backend_config(1)).unwrap();

    let err = client.fetch_city_data("Madrid").await.unwrap_err();
    assert!(matches!(err, AirWatchError::Network { status: None, .. }));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let client = RemoteClient::new(&unreachable_backend()).unwrap();
    let err = client.check_health().await.unwrap_err();
    assert!(matches!(err, AirWatchError::Network { status: None, .. }));
}

#[tokio::test]
async fn test_prediction_by_city_and_sequence() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let by_city = client
        .request_prediction(&PredictionRequest::for_city("Madrid"))
        .await
        .unwrap();
    assert_eq!(by_city.predicted_pm25, 30.0);

    let rows = (0..10).map(|_| vec![24.0, 31.0]).collect();
    let request = PredictionRequest::from_rows(rows).unwrap();
    let by_sequence = client.request_prediction(&request).await.unwrap();
    assert_eq!(by_sequence.predicted_pm25, 24.0);
    assert_eq!(by_sequence.confidence, 0.85);
}

#[tokio::test]
async fn test_invalid_sequence_never_reaches_backend() {
    let server = FakeServer::start().await;
    let client = RemoteClient::new(&server.backend_config(5)).unwrap();

    let request = PredictionRequest::Sequence {
        sequence: vec![[20.0, 30.0]; 9],
    };
    let err = client.request_prediction(&request).await.unwrap_err();
    assert!(matches!(err, AirWatchError::Validation { .. }));
    assert_eq!(server.state.predict_calls.load(Ordering::SeqCst), 0);
}

//! In-process fake of the prediction backend

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use airwatch::config::{BackendConfig, BackendMode};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};

#[derive(Default)]
pub struct FakeState {
    pub healthy: AtomicBool,
    pub bad_confidence: AtomicBool,
    pub city_calls: AtomicUsize,
    pub predict_calls: AtomicUsize,
    pub slow_seconds: AtomicUsize,
}

pub struct FakeServer {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        state.healthy.store(true, Ordering::SeqCst);

        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/cities", get(cities))
            .route("/api/cities/{name}", get(city_data))
            .route("/api/predict", post(predict))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn backend_config(&self, timeout_seconds: u32) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url(),
            timeout_seconds,
            mode: BackendMode::Live,
        }
    }
}

/// Config pointing at a port nothing listens on
pub fn unreachable_backend() -> BackendConfig {
    BackendConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 2,
        mode: BackendMode::Live,
    }
}

async fn health(State(state): State<Arc<FakeState>>) -> (StatusCode, Json<Value>) {
    if state.healthy.load(Ordering::SeqCst) {
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "message": "Air quality API running",
                "timestamp": "2024-01-15T10:00:00",
                "model_loaded": true,
                "device": "cpu"
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "message": "model not loaded" })),
        )
    }
}

async fn cities() -> Json<Value> {
    Json(json!({
        "success": true,
        "cities": [
            { "id": "4", "name": "Madrid", "state": "Madrid", "country": "Spain" },
            { "id": "6", "name": "Mendoza", "state": "Mendoza", "country": "Argentina" },
            { "id": "8", "name": "São Paulo", "state": "Sao Paulo", "country": "Brazil" }
        ],
        "total": 3
    }))
}

async fn city_data(
    State(state): State<Arc<FakeState>>,
    Path(name): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.city_calls.fetch_add(1, Ordering::SeqCst);

    let slow = state.slow_seconds.load(Ordering::SeqCst);
    if slow > 0 {
        tokio::time::sleep(Duration::from_secs(slow as u64)).await;
    }

    let pm25 = match name.as_str() {
        "Madrid" => 9.1,
        "São Paulo" => 41.7,
        "Mendoza" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "sensor offline" })),
            );
        }
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "message": format!("Ciudad {name} no encontrada")
                })),
            );
        }
    };

    let confidence = if state.bad_confidence.load(Ordering::SeqCst) {
        1.7
    } else {
        0.85
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "city": name,
            "data": {
                "current": {
                    "pm25": pm25,
                    "no2": 28.0,
                    "aqi": 51.0,
                    "quality_level": "BUENA",
                    "quality_emoji": "🟢",
                    "weather": {
                        "temperature": 17.0,
                        "humidity": 58.0,
                        "wind_speed": 9.0,
                        "pressure": 1013
                    }
                },
                "prediction": {
                    "current_pm25": pm25,
                    "predicted_pm25": pm25 + 0.8,
                    "prediction_date": "2024-01-16",
                    "confidence": confidence
                }
            }
        })),
    )
}

async fn predict(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.predict_calls.fetch_add(1, Ordering::SeqCst);

    let predicted = if let Some(sequence) = body.get("sequence").and_then(Value::as_array) {
        sequence
            .iter()
            .filter_map(|day| day.get(0).and_then(Value::as_f64))
            .sum::<f64>()
            / sequence.len().max(1) as f64
    } else if body.get("city").is_some() {
        30.0
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "city or sequence required" })),
        );
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "prediction": {
                "predicted_pm25": predicted,
                "prediction_date": "2024-01-16T00:00:00",
                "confidence": 0.85
            }
        })),
    )
}

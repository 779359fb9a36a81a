//! In-memory backend used by unit tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{CityDataBundle, CityRecord, CurrentReading, Prediction, PredictionRequest};
use crate::remote::{AirQualityBackend, HealthStatus};
use crate::{AirWatchError, Result};

pub fn live_bundle(pm25: f64) -> CityDataBundle {
    CityDataBundle::new(
        CurrentReading::new(pm25, 60, 21.0, 50.0),
        Prediction::new(
            pm25 + 1.0,
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
            0.9,
        ),
    )
}

#[derive(Clone)]
enum Reply {
    Bundle(CityDataBundle),
    Unreachable,
}

/// Scripted backend: known cities answer after an optional delay, everything
/// else is a 404
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<HashMap<String, (Duration, Reply)>>,
    healthy: Mutex<bool>,
    cities: Mutex<Option<Vec<CityRecord>>>,
    prediction: Mutex<Option<Prediction>>,
    data_calls: AtomicUsize,
    health_calls: AtomicUsize,
    prediction_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            healthy: Mutex::new(true),
            ..Self::default()
        }
    }

    pub fn with_city(self, name: &str, bundle: CityDataBundle) -> Self {
        self.with_delayed_city(name, bundle, Duration::ZERO)
    }

    pub fn with_delayed_city(self, name: &str, bundle: CityDataBundle, delay: Duration) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(name.to_string(), (delay, Reply::Bundle(bundle)));
        self
    }

    pub fn with_unreachable_city(self, name: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(name.to_string(), (Duration::ZERO, Reply::Unreachable));
        self
    }

    pub fn with_cities(self, cities: Vec<CityRecord>) -> Self {
        *self.cities.lock().unwrap() = Some(cities);
        self
    }

    pub fn with_prediction(self, prediction: Prediction) -> Self {
        *self.prediction.lock().unwrap() = Some(prediction);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().unwrap() = healthy;
    }

    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn prediction_calls(&self) -> usize {
        self.prediction_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AirQualityBackend for FakeBackend {
    async fn check_health(&self) -> Result<HealthStatus> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if *self.healthy.lock().unwrap() {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                model_loaded: true,
                device: Some("cpu".to_string()),
            })
        } else {
            Err(AirWatchError::network("/api/health: backend unreachable"))
        }
    }

    async fn list_cities(&self) -> Result<Vec<CityRecord>> {
        self.cities
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AirWatchError::network("/api/cities: backend unreachable"))
    }

    async fn fetch_city_data(&self, name: &str) -> Result<CityDataBundle> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().get(name).cloned();
        match reply {
            Some((delay, reply)) => {
                tokio::time::sleep(delay).await;
                match reply {
                    Reply::Bundle(bundle) => Ok(bundle),
                    Reply::Unreachable => Err(AirWatchError::network(format!(
                        "/api/cities/{name}: request timed out"
                    ))),
                }
            }
            None => Err(AirWatchError::not_found(name)),
        }
    }

    async fn request_prediction(&self, request: &PredictionRequest) -> Result<Prediction> {
        request.validate()?;
        self.prediction_calls.fetch_add(1, Ordering::SeqCst);
        self.prediction
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AirWatchError::http_status(503, "/api/predict: model not loaded"))
    }
}

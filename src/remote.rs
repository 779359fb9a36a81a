//! Backend API client for the air-quality prediction service
//!
//! This module provides the HTTP client used to reach the backend's health,
//! cities, city-data and predict endpoints. Every call is bounded by the
//! configured timeout and never retried here; callers decide what to do on
//! failure. Payloads are decoded into private wire structs and validated before
//! they become domain types.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::BackendConfig;
use crate::models::{CityDataBundle, CityRecord, Prediction, PredictionRequest};
use crate::{AirWatchError, Result};

/// Backend health as reported by `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub device: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Operations the rest of the crate needs from the backend
#[async_trait]
pub trait AirQualityBackend: Send + Sync {
    async fn check_health(&self) -> Result<HealthStatus>;
    async fn list_cities(&self) -> Result<Vec<CityRecord>>;
    async fn fetch_city_data(&self, name: &str) -> Result<CityDataBundle>;
    async fn request_prediction(&self, request: &PredictionRequest) -> Result<Prediction>;
}

/// HTTP client for the prediction backend
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a new backend client
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("AirWatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AirWatchError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn transport failures and non-success statuses into errors
    async fn send(&self, request: reqwest::RequestBuilder, endpoint: &str) -> Result<Response> {
        let start = Instant::now();

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                "backend unreachable".to_string()
            } else {
                e.to_string()
            };
            warn!(
                "Request to {} failed after {:.3}s: {}",
                endpoint,
                start.elapsed().as_secs_f64(),
                reason
            );
            AirWatchError::network(format!("{endpoint}: {reason}"))
        })?;

        let status = response.status();
        debug!(
            "HTTP response from {}: {} in {:.3}s",
            endpoint,
            status,
            start.elapsed().as_secs_f64()
        );

        if status.is_success() {
            return Ok(response);
        }

        let body: Option<WireFailure> = response.json().await.ok();
        let detail = body
            .and_then(|b| b.message.or(b.detail))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        Err(AirWatchError::http_status(
            status.as_u16(),
            format!("{endpoint} returned {status}: {detail}"),
        ))
    }

    async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse {} response: {}", endpoint, e);
            AirWatchError::validation(format!("malformed {endpoint} response: {e}"))
        })
    }
}

#[async_trait]
impl AirQualityBackend for RemoteClient {
    #[instrument(skip(self))]
    async fn check_health(&self) -> Result<HealthStatus> {
        let endpoint = "/api/health";
        let response = self.send(self.client.get(self.url(endpoint)), endpoint).await?;
        let health: wire::HealthResponse = Self::decode(response, endpoint).await?;
        debug!("Backend health: {:?}", health);
        Ok(health.into())
    }

    #[instrument(skip(self))]
    async fn list_cities(&self) -> Result<Vec<CityRecord>> {
        let endpoint = "/api/cities";
        let response = self.send(self.client.get(self.url(endpoint)), endpoint).await?;
        let body: wire::CitiesResponse = Self::decode(response, endpoint).await?;
        let cities = body.into_records()?;
        info!("Backend lists {} cities", cities.len());
        Ok(cities)
    }

    #[instrument(skip(self))]
    async fn fetch_city_data(&self, name: &str) -> Result<CityDataBundle> {
        let endpoint = format!("/api/cities/{}", urlencoding::encode(name));
        let start = Instant::now();

        let response = match self.send(self.client.get(self.url(&endpoint)), &endpoint).await {
            Err(AirWatchError::Network {
                status: Some(404), ..
            }) => return Err(AirWatchError::not_found(name)),
            other => other?,
        };

        let body: wire::CityDataResponse = Self::decode(response, &endpoint).await?;
        let bundle = body.into_bundle(name)?;

        info!(
            "Retrieved live data for {} in {:.3}s (pm25 {:.1})",
            name,
            start.elapsed().as_secs_f64(),
            bundle.current.pm25
        );
        Ok(bundle)
    }

    #[instrument(skip(self, request))]
    async fn request_prediction(&self, request: &PredictionRequest) -> Result<Prediction> {
        request.validate()?;

        let endpoint = "/api/predict";
        let response = self
            .send(self.client.post(self.url(endpoint)).json(request), endpoint)
            .await?;
        let body: wire::PredictionResponse = Self::decode(response, endpoint).await?;
        let prediction = body.into_prediction()?;

        info!(
            "Backend predicted {:.1} μg/m³ for {} (confidence {:.2})",
            prediction.predicted_pm25, prediction.prediction_date, prediction.confidence
        );
        Ok(prediction)
    }
}

/// Error body shapes the backend uses (`message` from the API, `detail` from the framework)
#[derive(Debug, Deserialize)]
struct WireFailure {
    message: Option<String>,
    detail: Option<String>,
}

/// Backend response structures and conversion into domain types
mod wire {
    use chrono::NaiveDate;
    use serde::Deserialize;

    use super::HealthStatus;
    use crate::models::{CityDataBundle, CityRecord, CurrentReading, Prediction};
    use crate::{AirWatchError, Result};

    #[derive(Debug, Deserialize)]
    pub struct HealthResponse {
        pub status: String,
        #[serde(default)]
        pub model_loaded: bool,
        pub device: Option<String>,
    }

    impl From<HealthResponse> for HealthStatus {
        fn from(value: HealthResponse) -> Self {
            Self {
                status: value.status,
                model_loaded: value.model_loaded,
                device: value.device,
            }
        }
    }

    /// City ids arrive as strings ("1") or numbers (1)
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum WireId {
        Text(String),
        Number(u64),
    }

    impl std::fmt::Display for WireId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                WireId::Text(text) => write!(f, "{text}"),
                WireId::Number(n) => write!(f, "{n}"),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct WireCity {
        pub id: WireId,
        pub name: String,
        pub country: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CitiesResponse {
        pub success: bool,
        #[serde(default)]
        pub cities: Vec<WireCity>,
        pub message: Option<String>,
    }

    impl CitiesResponse {
        pub fn into_records(self) -> Result<Vec<CityRecord>> {
            if !self.success {
                return Err(AirWatchError::network(
                    self.message
                        .unwrap_or_else(|| "backend could not list cities".to_string()),
                ));
            }
            Ok(self
                .cities
                .into_iter()
                .map(|city| CityRecord {
                    id: city.id.to_string(),
                    name: city.name,
                    country: city.country,
                })
                .collect())
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct WireWeather {
        pub temperature: Option<f64>,
        pub humidity: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WireCurrent {
        pub pm25: Option<f64>,
        pub aqi: Option<f64>,
        pub temperature: Option<f64>,
        pub humidity: Option<f64>,
        pub weather: Option<WireWeather>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WirePrediction {
        #[serde(alias = "pm25_predicted")]
        pub predicted_pm25: Option<f64>,
        #[serde(alias = "prediction_for")]
        pub prediction_date: Option<String>,
        pub confidence: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WireBundle {
        pub current: Option<WireCurrent>,
        pub prediction: Option<WirePrediction>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CityDataResponse {
        pub success: bool,
        pub data: Option<WireBundle>,
        pub message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PredictionResponse {
        pub success: bool,
        pub prediction: Option<WirePrediction>,
        pub message: Option<String>,
    }

    fn required<T>(value: Option<T>, field: &str) -> Result<T> {
        value.ok_or_else(|| AirWatchError::validation(format!("incomplete data: missing {field}")))
    }

    impl WireCurrent {
        fn into_reading(self) -> Result<CurrentReading> {
            let (nested_temperature, nested_humidity) = self
                .weather
                .map_or((None, None), |w| (w.temperature, w.humidity));

            let pm25 = required(self.pm25, "current.pm25")?;
            let aqi = required(self.aqi, "current.aqi")?;
            let temperature = required(
                self.temperature.or(nested_temperature),
                "current.temperature",
            )?;
            let humidity = required(self.humidity.or(nested_humidity), "current.humidity")?;

            if !aqi.is_finite() || aqi < 0.0 || aqi > f64::from(u32::MAX) {
                return Err(AirWatchError::validation(format!(
                    "aqi must be a non-negative number, got: {aqi}"
                )));
            }

            let reading = CurrentReading::new(pm25, aqi.round() as u32, temperature, humidity);
            reading.validate()?;
            Ok(reading)
        }
    }

    impl WirePrediction {
        fn into_prediction(self) -> Result<Prediction> {
            let predicted_pm25 = required(self.predicted_pm25, "prediction.predicted_pm25")?;
            let raw_date = required(self.prediction_date, "prediction.prediction_date")?;
            let confidence = required(self.confidence, "prediction.confidence")?;

            // Accept plain dates and full ISO timestamps
            let date_part = raw_date.get(..10).unwrap_or(&raw_date);
            let prediction_date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
                AirWatchError::validation(format!("prediction date is not an ISO date: {raw_date}"))
            })?;

            let prediction = Prediction::new(predicted_pm25, prediction_date, confidence);
            prediction.validate()?;
            Ok(prediction)
        }
    }

    impl CityDataResponse {
        pub fn into_bundle(self, city: &str) -> Result<CityDataBundle> {
            if !self.success {
                return Err(AirWatchError::network(self.message.unwrap_or_else(|| {
                    format!("backend reported failure for {city}")
                })));
            }
            let data = required(self.data, "data")?;
            let current = required(data.current, "current")?.into_reading()?;
            let prediction = required(data.prediction, "prediction")?.into_prediction()?;
            Ok(CityDataBundle::new(current, prediction))
        }
    }

    impl PredictionResponse {
        pub fn into_prediction(self) -> Result<Prediction> {
            if !self.success {
                return Err(AirWatchError::network(
                    self.message
                        .unwrap_or_else(|| "backend could not produce a prediction".to_string()),
                ));
            }
            required(self.prediction, "prediction")?.into_prediction()
        }
    }

}

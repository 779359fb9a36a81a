//! HTTP surface for the presentation layer
//!
//! Exposes the read-only view state and the controller operations as JSON
//! endpoints. Mounted under `/api` by [`crate::web`].

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::AirWatchError;
use crate::controller::{ForecastInput, ViewState, ViewStateController};
use crate::models::{CityRecord, Prediction};

type AppState = Arc<ViewStateController>;
type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendStatus {
    pub backend_online: bool,
}

/// Selector entry with its rendered label
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityOption {
    pub id: String,
    pub name: String,
    pub country: Option<String>,
    pub label: String,
}

impl From<&CityRecord> for CityOption {
    fn from(city: &CityRecord) -> Self {
        Self {
            id: city.id.clone(),
            name: city.name.clone(),
            country: city.country.clone(),
            label: city.display_label(),
        }
    }
}

/// Pre-formatted text for the displayed bundle
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ReadingDisplay {
    pub quality_label: String,
    pub pm25_text: String,
    pub confidence_percent: u8,
}

/// View state plus display text, so the page renders without its own formatting
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewResponse {
    #[serde(flatten)]
    pub view: ViewState,
    pub display: Option<ReadingDisplay>,
}

impl From<ViewState> for ViewResponse {
    fn from(view: ViewState) -> Self {
        let display = view.bundle.as_ref().map(|bundle| ReadingDisplay {
            quality_label: bundle.current.quality_level.label().to_string(),
            pm25_text: bundle.current.format_pm25(),
            confidence_percent: bundle.prediction.confidence_percent(),
        });
        Self { view, display }
    }
}

/// Either `{city}`, `{city, synthetic: true}` or `{sequence: [[pm25, no2], ...]}`
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub city: Option<String>,
    pub sequence: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub synthetic: bool,
}

impl TryFrom<ForecastRequest> for ForecastInput {
    type Error = AirWatchError;

    fn try_from(request: ForecastRequest) -> Result<Self, Self::Error> {
        match (request.sequence, request.city) {
            (Some(rows), _) => Ok(ForecastInput::Rows(rows)),
            (None, Some(city)) if request.synthetic => Ok(ForecastInput::SyntheticHistory(city)),
            (None, Some(city)) => Ok(ForecastInput::City(city)),
            (None, None) => Err(AirWatchError::validation(
                "request must contain a city or a sequence",
            )),
        }
    }
}

fn error_response(err: &AirWatchError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        AirWatchError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AirWatchError::NotFound { .. } => StatusCode::NOT_FOUND,
        AirWatchError::Network { .. } => StatusCode::BAD_GATEWAY,
        AirWatchError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AirWatchError::Config { .. } | AirWatchError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
        }),
    )
}

pub fn router(controller: AppState) -> Router {
    Router::new()
        .route("/view", get(get_view))
        .route("/cities", get(get_cities))
        .route("/select", post(select_city))
        .route("/refresh", post(refresh))
        .route("/check-backend", post(check_backend))
        .route("/forecast", post(request_forecast))
        .with_state(controller)
}

async fn get_view(State(controller): State<AppState>) -> Json<ViewResponse> {
    Json(controller.snapshot().into())
}

async fn get_cities(State(controller): State<AppState>) -> Json<Vec<CityOption>> {
    Json(controller.snapshot().cities.iter().map(CityOption::from).collect())
}

async fn select_city(
    State(controller): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> ApiResult<ViewResponse> {
    let city = payload.city.trim();
    if city.is_empty() {
        return Err(error_response(&AirWatchError::validation(
            "city cannot be empty",
        )));
    }
    controller.select_city(city).await;
    Ok(Json(controller.snapshot().into()))
}

async fn refresh(State(controller): State<AppState>) -> Json<ViewResponse> {
    controller.refresh().await;
    Json(controller.snapshot().into())
}

async fn check_backend(State(controller): State<AppState>) -> Json<BackendStatus> {
    let backend_online = controller.check_backend().await;
    Json(BackendStatus { backend_online })
}

async fn request_forecast(
    State(controller): State<AppState>,
    Json(payload): Json<ForecastRequest>,
) -> ApiResult<Prediction> {
    let input = ForecastInput::try_from(payload).map_err(|e| error_response(&e))?;
    controller
        .request_forecast(input)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

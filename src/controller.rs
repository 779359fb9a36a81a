//! View state controller
//!
//! Owns the single view state container for the widget. State lives in a
//! `tokio::sync::watch` channel so the presentation layer can subscribe to
//! changes; it is only ever mutated from the operations in this module.
//!
//! Selections may overlap. Each one is tagged with a generation number and the
//! city name, and its result is applied only if both still match the latest
//! selection when it arrives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::config::{BackendMode, ControllerConfig};
use crate::models::{CityDataBundle, CityRecord, DataSource, Prediction, PredictionRequest};
use crate::resolution::{ResolutionMode, ResolutionPolicy};
use crate::simulator::HistorySimulator;
use crate::{AirWatchError, Result};

/// Lifecycle of the displayed city data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewState {
    pub phase: ViewPhase,
    pub loading: bool,
    /// Blocking error; the user can only retry
    pub error: Option<String>,
    /// Non-blocking notice shown while fallback data renders
    pub warning: Option<String>,
    /// Display only, never gates resolution
    pub backend_online: bool,
    pub selected_city: Option<String>,
    pub bundle: Option<CityDataBundle>,
    pub source: Option<DataSource>,
    pub cities: Vec<CityRecord>,
    pub mode: ResolutionMode,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ViewState {
    fn initial(mode: ResolutionMode) -> Self {
        Self {
            phase: ViewPhase::Idle,
            loading: false,
            error: None,
            warning: None,
            backend_online: false,
            selected_city: None,
            bundle: None,
            source: None,
            cities: Vec::new(),
            mode,
            last_updated: None,
        }
    }
}

/// Whether a selection's result reached the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Applied,
    /// A newer selection superseded this one
    Discarded,
}

/// Ways to ask for a next-day forecast
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastInput {
    /// Let the backend use its own history for the city
    City(String),
    /// Send a synthetic history generated for the city
    SyntheticHistory(String),
    /// Send explicit daily `[pm25, no2]` rows
    Rows(Vec<Vec<f64>>),
}

/// Handle to a periodic background task; aborts the task when cancelled or dropped
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    pub fn cancel(&self) {
        debug!("Cancelling background task {}", self.name);
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct ViewStateController {
    policy: ResolutionPolicy,
    state: watch::Sender<ViewState>,
    generation: AtomicU64,
    default_city: String,
    backend_mode: BackendMode,
    simulator: HistorySimulator,
}

impl ViewStateController {
    pub fn new(
        policy: ResolutionPolicy,
        config: &ControllerConfig,
        backend_mode: BackendMode,
    ) -> Self {
        let mode = match backend_mode {
            BackendMode::Offline => ResolutionMode::Offline,
            BackendMode::Auto | BackendMode::Live => ResolutionMode::LivePreferred,
        };
        let (state, _) = watch::channel(ViewState::initial(mode));

        Self {
            policy,
            state,
            generation: AtomicU64::new(0),
            default_city: config.default_city.clone(),
            backend_mode,
            simulator: HistorySimulator::new(),
        }
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    /// Pick the resolution mode, load the city list and select the default city
    #[instrument(skip(self))]
    pub async fn mount(&self) -> SelectionOutcome {
        match self.backend_mode {
            BackendMode::Offline => {
                info!("Backend mode is offline, using fallback data only");
            }
            BackendMode::Live => {
                self.check_backend().await;
            }
            BackendMode::Auto => {
                let online = self.check_backend().await;
                let mode = if online {
                    ResolutionMode::LivePreferred
                } else {
                    ResolutionMode::Offline
                };
                info!("Startup health check chose {:?} mode", mode);
                self.state.send_modify(|state| state.mode = mode);
            }
        }

        let mode = self.state.borrow().mode;
        let cities = self.policy.resolve_cities(mode).await;
        self.state.send_modify(|state| state.cities = cities);

        let city = self.default_city.clone();
        self.load(&city).await
    }

    /// Select a city and resolve its data
    #[instrument(skip(self))]
    pub async fn select_city(&self, name: &str) -> SelectionOutcome {
        self.load(name).await
    }

    /// Re-resolve the selected city without changing the selection
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> SelectionOutcome {
        let city = self
            .state
            .borrow()
            .selected_city
            .clone()
            .unwrap_or_else(|| self.default_city.clone());
        self.load(&city).await
    }

    async fn load(&self, city: &str) -> SelectionOutcome {
        let mut generation = 0;
        let mode = self.state.borrow().mode;

        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.phase = ViewPhase::Loading;
            state.loading = true;
            state.error = None;
            state.warning = None;
            state.bundle = None;
            state.source = None;
            state.selected_city = Some(city.to_string());
        });
        debug!("Selection #{} started for {}", generation, city);

        let outcome = self.policy.resolve(city, mode).await;

        let applied = self.state.send_if_modified(|state| {
            let current = self.generation.load(Ordering::SeqCst) == generation
                && state.selected_city.as_deref() == Some(city);
            if !current {
                return false;
            }

            state.loading = false;
            match &outcome {
                Ok(result) => {
                    state.phase = ViewPhase::Ready;
                    state.error = None;
                    state.warning = result
                        .is_degraded()
                        .then(|| self.fallback_warning(result.error_message.as_deref()));
                    state.bundle = Some(result.bundle.clone());
                    state.source = Some(result.source);
                    state.last_updated = Some(Utc::now());
                }
                Err(e) => {
                    state.phase = ViewPhase::Failed;
                    state.error = Some(e.user_message());
                    state.warning = None;
                    state.bundle = None;
                    state.source = None;
                }
            }
            true
        });

        if applied {
            SelectionOutcome::Applied
        } else {
            debug!("Selection #{} for {} was superseded", generation, city);
            SelectionOutcome::Discarded
        }
    }

    /// Notice shown next to fallback data, naming why the backend was not used
    fn fallback_warning(&self, failure: Option<&str>) -> String {
        match (failure, self.backend_mode) {
            (Some(reason), _) => format!("Showing cached demo data ({reason})"),
            (None, BackendMode::Auto) => {
                "Showing cached demo data (backend was unavailable at startup, offline mode)"
                    .to_string()
            }
            (None, _) => "Showing cached demo data (offline mode)".to_string(),
        }
    }

    /// Check backend health and record whether it is online
    #[instrument(skip(self))]
    pub async fn check_backend(&self) -> bool {
        let online = match self.policy.backend().check_health().await {
            Ok(health) => {
                if !health.is_healthy() {
                    warn!("Backend reports status {}", health.status);
                }
                health.is_healthy()
            }
            Err(e) => {
                warn!("Backend health check failed: {}", e);
                false
            }
        };

        let changed = self.state.send_if_modified(|state| {
            let changed = state.backend_online != online;
            state.backend_online = online;
            changed
        });
        if changed {
            info!("Backend is now {}", if online { "online" } else { "offline" });
        }
        online
    }

    /// Ask the backend for a next-day forecast
    #[instrument(skip(self))]
    pub async fn request_forecast(&self, input: ForecastInput) -> Result<Prediction> {
        let request = match input {
            ForecastInput::City(city) => Ok(PredictionRequest::for_city(city)),
            ForecastInput::SyntheticHistory(city) => self.simulator.prediction_request(&city),
            ForecastInput::Rows(rows) => PredictionRequest::from_rows(rows),
        }
        .and_then(|request| request.validate().map(|()| request));

        let request = match request {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected forecast request: {}", e);
                if matches!(e, AirWatchError::Validation { .. }) {
                    let message = e.user_message();
                    self.state.send_modify(|state| state.error = Some(message));
                }
                return Err(e);
            }
        };

        match self.policy.backend().request_prediction(&request).await {
            Ok(prediction) => {
                self.state.send_if_modified(|state| {
                    if state.phase == ViewPhase::Failed || state.error.is_none() {
                        return false;
                    }
                    state.error = None;
                    true
                });
                Ok(prediction)
            }
            Err(e) => {
                warn!("Forecast request failed: {}", e);
                if matches!(e, AirWatchError::Validation { .. }) {
                    let message = e.user_message();
                    self.state.send_modify(|state| state.error = Some(message));
                }
                Err(e)
            }
        }
    }

    /// Check backend health every `interval` until the handle is dropped
    pub fn spawn_health_monitor(self: &Arc<Self>, interval: Duration) -> BackgroundTask {
        info!("Starting backend health monitor every {:?}", interval);
        let controller = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(controller) = Weak::upgrade(&controller) else {
                    break;
                };
                controller.check_backend().await;
            }
        });
        BackgroundTask {
            name: "health-monitor",
            handle,
        }
    }

    /// Refresh the selected city every `interval`, starting one interval from now
    pub fn spawn_auto_refresh(self: &Arc<Self>, interval: Duration) -> BackgroundTask {
        info!("Starting auto refresh every {:?}", interval);
        let controller = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(controller) = Weak::upgrade(&controller) else {
                    break;
                };
                controller.refresh().await;
            }
        });
        BackgroundTask {
            name: "auto-refresh",
            handle,
        }
    }
}

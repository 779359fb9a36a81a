//! City Data Resolution Module
//!
//! Decides, per requested city, between the live backend and the static fallback
//! table. Every successful resolution yields a complete bundle; live and fallback
//! fields are never mixed.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::fallback::FallbackTable;
use crate::models::{CityRecord, ResolutionResult};
use crate::remote::AirQualityBackend;
use crate::{AirWatchError, Result};

/// Whether the backend may be consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionMode {
    /// Try the backend, substitute from the table on any failure
    LivePreferred,
    /// Resolve from the table only
    Offline,
}

/// Service for resolving a city name into displayable data
pub struct ResolutionPolicy {
    backend: Arc<dyn AirQualityBackend>,
    table: FallbackTable,
}

impl ResolutionPolicy {
    pub fn new(backend: Arc<dyn AirQualityBackend>, table: FallbackTable) -> Self {
        Self { backend, table }
    }

    pub fn backend(&self) -> &Arc<dyn AirQualityBackend> {
        &self.backend
    }

    /// Resolve one city, falling back to the table when the backend fails
    #[instrument(skip(self))]
    pub async fn resolve(&self, city: &str, mode: ResolutionMode) -> Result<ResolutionResult> {
        match mode {
            ResolutionMode::Offline => {
                debug!("Resolving {} offline", city);
                self.from_table(city, None)
            }
            ResolutionMode::LivePreferred => match self.backend.fetch_city_data(city).await {
                Ok(bundle) => {
                    info!("Resolved {} from backend", city);
                    Ok(ResolutionResult::live(bundle))
                }
                Err(e) => {
                    warn!("Backend failed for {}, using fallback data: {}", city, e);
                    self.from_table(city, Some(e.to_string()))
                }
            },
        }
    }

    fn from_table(&self, city: &str, failure: Option<String>) -> Result<ResolutionResult> {
        match self.table.bundle_for(city) {
            Some(bundle) => Ok(ResolutionResult::fallback(bundle, failure)),
            None => {
                let reason = match failure {
                    Some(failure) => {
                        format!("backend failed ({failure}) and no fallback entry exists")
                    }
                    None => "no fallback entry exists".to_string(),
                };
                warn!("No data for {}: {}", city, reason);
                Err(AirWatchError::data_unavailable(city, reason))
            }
        }
    }

    /// City list for the selector: the backend's list when reachable, otherwise the table's
    #[instrument(skip(self))]
    pub async fn resolve_cities(&self, mode: ResolutionMode) -> Vec<CityRecord> {
        if mode == ResolutionMode::Offline {
            return self.table.cities();
        }

        match self.backend.list_cities().await {
            Ok(cities) if !cities.is_empty() => cities,
            Ok(_) => {
                warn!("Backend returned an empty city list, using fallback cities");
                self.table.cities()
            }
            Err(e) => {
                warn!("Failed to list cities from backend, using fallback cities: {}", e);
                self.table.cities()
            }
        }
    }
}

//! `AirWatch` - Air-quality widget core
//!
//! This library resolves PM2.5 readings and next-day forecasts for a fixed set
//! of cities, preferring a live prediction backend and falling back to static
//! data when it is unavailable, and keeps a view state for the presentation
//! layer.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod fallback;
pub mod models;
pub mod remote;
pub mod resolution;
pub mod simulator;
pub mod telemetry;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export core types for public API
pub use config::{AirWatchConfig, BackendMode};
pub use controller::{
    BackgroundTask, ForecastInput, SelectionOutcome, ViewPhase, ViewState, ViewStateController,
};
pub use error::AirWatchError;
pub use fallback::FallbackTable;
pub use models::{
    CityDataBundle, CityRecord, CurrentReading, DataSource, Prediction, PredictionRequest,
    QualityLevel, ResolutionResult,
};
pub use remote::{AirQualityBackend, HealthStatus, RemoteClient};
pub use resolution::{ResolutionMode, ResolutionPolicy};
pub use simulator::HistorySimulator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirWatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

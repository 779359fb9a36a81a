//! Data models for the AirWatch widget core
//!
//! This module contains the core domain models organized by concern:
//! - City: reference records for the selectable cities
//! - Reading: current air-quality measurements and their quality level
//! - Forecast: next-day predictions and prediction requests
//! - Bundle: the complete unit handed to the view, plus its provenance

pub mod bundle;
pub mod city;
pub mod forecast;
pub mod reading;

// Re-export all public types for convenient access
pub use bundle::{CityDataBundle, DataSource, ResolutionResult};
pub use city::CityRecord;
pub use forecast::{Prediction, PredictionRequest};
pub use reading::{CurrentReading, QualityLevel};
